pub mod artifact;
pub mod knn;
pub mod scaler;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use artifact::{FittedModel, ModelArtifact, FORMAT_VERSION};
pub use knn::{KNeighbors, KNeighborsModel};
pub use scaler::RobustScaler;
pub use traits::{Estimator, Regressor};
pub use types::{feature_matrix, matrix_row, matrix_rows, Algorithm, FeatureMatrix};
