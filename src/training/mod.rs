pub mod dataset;
pub mod metrics;
pub mod pipeline;
pub mod split;

pub use dataset::TrainingSet;
pub use metrics::EvaluationMetrics;
pub use pipeline::{run, train, TrainingOutcome};
pub use split::{train_test_split, Split};
