// 默认配置常量

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_SALES_PATH: &str = "data/kc_house_data.csv";
pub const DEFAULT_DEMOGRAPHICS_PATH: &str = "data/zipcode_demographics.csv";
pub const DEFAULT_REGION_KEY: &str = "zipcode";
pub const DEFAULT_TARGET_COLUMN: &str = "price";
pub const DEFAULT_SALES_COLUMNS: &[&str] = &[
    "price",
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "sqft_above",
    "sqft_basement",
    "zipcode",
];

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_NEIGHBORS: usize = 5;

pub const DEFAULT_OUTPUT_DIR: &str = "model";
pub const DEFAULT_REGISTRY_ROOT: &str = "registry";
pub const DEFAULT_MODEL_NAME: &str = "housing-price-reg-model";
pub const DEFAULT_MODEL_VERSION: &str = "latest";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "compact";

pub const ENV_PREFIX: &str = "HOUSING";
