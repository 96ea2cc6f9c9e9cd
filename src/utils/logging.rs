//! 日志系统
//!
//! 提供基于 tracing 的日志系统，支持：
//! - 可配置的日志级别（`RUST_LOG` 优先）
//! - 多种日志格式（JSON、Pretty、Compact）
//! - 同时输出到多个目标（stdout、stderr、文件）

use crate::api::error::ConfigError;
use crate::config::LoggingConfig;
use crate::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// 初始化日志系统
///
/// 每个输出目标一个 layer；进程内只能成功调用一次。
///
/// # 示例
///
/// ```no_run
/// use housing_predictor::config::LoggingConfig;
/// use housing_predictor::utils::logging::init_logging;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: "json".to_string(),
///     output: vec!["stdout".to_string(), "logs/app.log".to_string()],
/// };
///
/// init_logging(&config).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    let outputs: Vec<&str> = if config.output.is_empty() {
        vec!["stdout"]
    } else {
        config.output.iter().map(String::as_str).collect()
    };

    let layers = outputs
        .iter()
        .map(|output| match *output {
            "stdout" => Ok(build_layer(&config.format, std::io::stdout)),
            "stderr" => Ok(build_layer(&config.format, std::io::stderr)),
            path => open_log_file(Path::new(path)).map(|file| build_layer(&config.format, Arc::new(file))),
        })
        .collect::<Result<Vec<BoxedLayer>>>()?;

    Registry::default()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| ConfigError::Invalid(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!(
        "Logging initialized: level={}, format={}, output={}",
        config.level,
        config.format,
        outputs.join(",")
    );

    Ok(())
}

/// `RUST_LOG` 优先，其次是配置中的级别，都无效时退回 info
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(level).unwrap_or_else(|_| {
            // 日志系统尚未初始化，只能直接写 stderr
            eprintln!("Warning: Invalid log level '{}', using 'info' as default", level);
            EnvFilter::new("info")
        })
    })
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::Invalid(format!("Failed to create log directory: {}", e))
        })?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ConfigError::Invalid(format!("Failed to open log file {}: {}", path.display(), e))
        })?;
    Ok(file)
}

fn build_layer<W>(format: &str, writer: W) -> BoxedLayer
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    match format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .with_writer(writer)
            .json()
            .with_target(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
        "pretty" | "human" => fmt::layer()
            .with_writer(writer)
            .pretty()
            .with_target(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        // 其余一律 compact
        _ => fmt::layer()
            .with_writer(writer)
            .compact()
            .with_target(true)
            .with_level(true)
            .boxed(),
    }
}
