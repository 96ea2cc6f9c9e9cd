pub mod defaults;
pub mod loader;
pub mod settings;

pub use settings::{
    ArtifactSource, ArtifactsConfig, Config, DataConfig, LoggingConfig, ServerConfig,
    ServingConfig, TrainingConfig,
};
