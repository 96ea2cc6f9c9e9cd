use crate::config::Config;
use crate::storage::{open_store, ArtifactStore, RegistryArtifactStore, VersionSelector};
use crate::training;
use crate::Result;

/// 训练并保存产物，打印评估指标
pub async fn train(config: Config, register: bool) -> Result<()> {
    let store: Box<dyn ArtifactStore> = if register {
        Box::new(RegistryArtifactStore::new(
            &config.artifacts.registry_root,
            config.artifacts.model_name.clone(),
            VersionSelector::Latest,
        ))
    } else {
        open_store(&config.artifacts)?
    };

    let (outcome, dir) = training::run(&config, store.as_ref()).await?;

    println!(
        "Trained on {} rows, evaluated on {} rows ({} rows dropped)",
        outcome.n_train, outcome.n_test, outcome.dropped
    );
    println!("{}", outcome.metrics);
    println!("Artifacts written to {}", dir.display());
    Ok(())
}
