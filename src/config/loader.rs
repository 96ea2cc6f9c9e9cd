use crate::api::error::ConfigError;
use crate::config::defaults::ENV_PREFIX;
use crate::config::settings::Config;
use crate::Result;
use config::{Config as ConfigBuilder, Environment, File};

/// 从文件加载配置
pub fn load_from_file(path: &str) -> Result<Config> {
    let config = ConfigBuilder::builder()
        .add_source(File::with_name(path))
        .add_source(environment())
        .build()
        .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

    finish(config)
}

/// 从环境变量加载配置
pub fn load_from_env() -> Result<Config> {
    let config = ConfigBuilder::builder()
        .add_source(environment())
        .build()
        .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

    finish(config)
}

/// `HOUSING_SERVER__PORT=9000` 形式的环境变量
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("data.sales_columns")
        .with_list_parse_key("logging.output")
        .try_parsing(true)
}

fn finish(config: ConfigBuilder) -> Result<Config> {
    let config: Config = config
        .try_deserialize()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
