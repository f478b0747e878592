//! Greenhouse job board access: API client, response types and the cached
//! position repository.

pub mod api_types;
pub mod client;
pub mod repository;
pub mod types;

pub use client::BoardClient;
pub use repository::PositionRepository;
pub use types::{Position, PositionsOutcome};
