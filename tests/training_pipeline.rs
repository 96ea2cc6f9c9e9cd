mod common;

use common::*;
use housing_predictor::api::error::DataLoadError;
use housing_predictor::features::{assemble, FeatureSchema, ReferenceStore};
use housing_predictor::models::Regressor;
use housing_predictor::storage::{
    ArtifactStore, LocalArtifactStore, RegistryArtifactStore, VersionSelector, FEATURES_FILE,
    METRICS_FILE, MODEL_FILE,
};
use housing_predictor::training::{self, EvaluationMetrics};
use housing_predictor::HousingError;
use tempfile::TempDir;

#[tokio::test]
async fn test_training_writes_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixtures(temp_dir.path());
    let store = LocalArtifactStore::new(&config.artifacts.output_dir);

    let (outcome, dir) = training::run(&config, &store).await.unwrap();
    assert_eq!(outcome.n_test, 12);
    assert_eq!(outcome.n_train, 48);
    assert_eq!(outcome.dropped, 0);

    for file in [MODEL_FILE, FEATURES_FILE, METRICS_FILE] {
        assert!(dir.join(file).exists(), "{} missing", file);
    }

    let schema = FeatureSchema::load(dir.join(FEATURES_FILE)).unwrap();
    assert_eq!(
        schema.columns(),
        &[
            "bedrooms",
            "bathrooms",
            "sqft_living",
            "sqft_lot",
            "floors",
            "sqft_above",
            "sqft_basement",
            "ppltn_qty",
            "urbn_ppltn_qty",
            "medn_hshld_incm_amt",
        ]
    );

    let metrics: EvaluationMetrics =
        serde_json::from_str(&std::fs::read_to_string(dir.join(METRICS_FILE)).unwrap()).unwrap();
    assert!((metrics.mae - outcome.metrics.mae).abs() < 1e-6);
    assert!((metrics.r2 - outcome.metrics.r2).abs() < 1e-9);
    assert!(metrics.rmse >= 0.0);
    assert!((metrics.rmse - metrics.mse.sqrt()).abs() < 1e-6);

    let model = store.load_model().await.unwrap();
    assert_eq!(model.feature_names(), schema.columns());
    assert_eq!(model.feature_count(), schema.len());
}

#[test]
fn test_training_is_reproducible() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = write_fixtures(temp_dir.path());

    let first = training::train(&config).unwrap();
    let second = training::train(&config).unwrap();
    assert_eq!(first.metrics, second.metrics);

    config.training.seed = 7;
    let reseeded = training::train(&config).unwrap();
    assert_eq!(reseeded.n_test, first.n_test);
}

#[test]
fn test_training_and_serving_share_feature_assembly() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixtures(temp_dir.path());
    let outcome = training::train(&config).unwrap();
    let reference = ReferenceStore::load(&config.data.demographics_path, "zipcode").unwrap();

    let input = housing_predictor::api::PropertyInput::parse(
        housing_predictor::api::RequestShape::Full,
        &typical_house(),
    )
    .unwrap();
    let vector = assemble(
        &input.to_record(),
        &reference,
        &outcome.schema,
        config.serving.missing_region,
    )
    .unwrap();

    assert_eq!(vector.len(), outcome.schema.len());
    assert_eq!(&vector.values()[..3], &[3.0, 2.0, 2000.0]);
    assert_eq!(&vector.values()[7..], &[41000.0, 41000.0, 52000.0]);
    assert!(outcome.artifact.predict(&vector).unwrap().is_finite());
}

#[tokio::test]
async fn test_register_publishes_versions() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_fixtures(temp_dir.path());
    let root = &config.artifacts.registry_root;
    let name = config.artifacts.model_name.clone();
    let publisher = RegistryArtifactStore::new(root, name.clone(), VersionSelector::Latest);

    let (_, first_dir) = training::run(&config, &publisher).await.unwrap();
    let (_, second_dir) = training::run(&config, &publisher).await.unwrap();
    assert!(first_dir.ends_with(format!("{}/1", name)));
    assert!(second_dir.ends_with(format!("{}/2", name)));

    let registry = publisher.registry().await.unwrap();
    let entry = registry.get(&name).unwrap();
    assert_eq!(entry.versions.len(), 2);
    assert_eq!(entry.latest().unwrap().version, 2);

    let pinned = RegistryArtifactStore::new(root, name.clone(), VersionSelector::Exact(1));
    assert_eq!(pinned.load_schema().await.unwrap().len(), 10);

    let missing = RegistryArtifactStore::new(root, name, VersionSelector::Exact(9));
    assert!(missing.load_model().await.is_err());
}

#[tokio::test]
async fn test_missing_demographics_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = write_fixtures(temp_dir.path());
    config.data.demographics_path = temp_dir.path().join("absent.csv");
    let store = LocalArtifactStore::new(&config.artifacts.output_dir);

    let err = training::run(&config, &store).await.unwrap_err();
    assert!(matches!(
        err,
        HousingError::DataLoad(DataLoadError::Unreadable { .. })
    ));
    assert!(!config.artifacts.output_dir.exists());
}
