pub mod health;
pub mod models;
pub mod predict;

pub use health::health;
pub use models::model_info;
pub use predict::{predict_basic, predict_full};
