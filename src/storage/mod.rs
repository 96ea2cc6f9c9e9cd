pub mod manager;
pub mod registry;

pub use manager::{ArtifactStore, LocalArtifactStore, FEATURES_FILE, METRICS_FILE, MODEL_FILE};
pub use registry::{ModelRegistry, RegistryArtifactStore, VersionManifest, VersionSelector};

use crate::config::{ArtifactSource, ArtifactsConfig};
use crate::Result;

/// 按配置选择产物存储实现
pub fn open_store(config: &ArtifactsConfig) -> Result<Box<dyn ArtifactStore>> {
    let store: Box<dyn ArtifactStore> = match config.source {
        ArtifactSource::Local => Box::new(LocalArtifactStore::new(&config.output_dir)),
        ArtifactSource::Registry => {
            let selector: VersionSelector = config.model_version.parse()?;
            Box::new(RegistryArtifactStore::new(
                &config.registry_root,
                config.model_name.clone(),
                selector,
            ))
        }
    };
    tracing::debug!(store = %store.describe(), "Opened artifact store");
    Ok(store)
}
