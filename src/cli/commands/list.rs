use crate::config::Config;
use crate::storage::{RegistryArtifactStore, VersionSelector};
use crate::Result;

/// 列出注册表中的模型版本
pub async fn list(config: Config) -> Result<()> {
    let root = &config.artifacts.registry_root;
    tracing::info!(root = %root.display(), "Listing registered models");

    let store = RegistryArtifactStore::new(
        root,
        config.artifacts.model_name.clone(),
        VersionSelector::Latest,
    );
    let registry = store.registry().await?;

    let mut empty = true;
    for (name, entry) in registry.list() {
        for manifest in &entry.versions {
            empty = false;
            println!(
                "{}  v{}  {}  features={}  r2={:.4}  {}",
                name,
                manifest.version,
                manifest.algorithm,
                manifest.feature_count,
                manifest.metrics.r2,
                manifest.created_at.to_rfc3339()
            );
        }
    }
    if empty {
        println!("No models registered under {}", root.display());
    }
    Ok(())
}
