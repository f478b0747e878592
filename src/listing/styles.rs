/// Stylesheet for the rendered listing markup
pub const STYLESHEET: &str = include_str!("../../assets/job-listings.css");
