pub mod error;
pub mod request;
pub mod response;

pub use error::{HousingError, Result};
pub use request::{BasicProperty, FullProperty, PropertyInput, RequestShape};
pub use response::{HealthResponse, ModelInfo, PredictionResponse};
