//! housing-predictor - home sale-price prediction enriched with zipcode demographics
//!
//! Training joins a sales table with a demographic reference table, fits a
//! k-nearest-neighbours regressor and writes versioned artifacts. Serving loads
//! those artifacts once and answers predictions over HTTP through the same
//! feature-assembly path used during training.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod cli;
pub mod config;
pub mod features;
pub mod inference;
pub mod models;
pub mod server;
pub mod storage;
pub mod training;
pub mod utils;

// Re-export commonly used types
pub use crate::api::error::{HousingError, Result};
pub use crate::config::Config;

/// housing-predictor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
