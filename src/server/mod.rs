pub mod http;

use crate::config::Config;
use crate::Result;

/// 启动服务器
pub async fn serve(config: Config) -> Result<()> {
    tracing::info!("Starting server...");
    http::serve(config).await
}
