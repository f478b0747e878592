//! Turning positions into embeddable markup.

pub mod aggregate;
pub mod render;
pub mod shortcode;
pub mod styles;
pub mod utils;

pub use render::{render, RenderOptions};
pub use shortcode::expand_shortcodes;
pub use styles::STYLESHEET;
