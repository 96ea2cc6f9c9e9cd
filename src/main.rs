use clap::Parser;
use housing_predictor::cli::{commands, Cli, Command};
use housing_predictor::utils::logging::init_logging;
use housing_predictor::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    let config = cli.load_config()?;

    init_logging(&config.logging)?;

    // 没有指定命令时默认启动服务器
    match cli.command {
        None | Some(Command::Serve) => commands::serve(config).await?,
        Some(Command::Train { register }) => commands::train(config, register).await?,
        Some(Command::Predict { input, basic }) => {
            commands::predict(config, &input, basic).await?
        }
        Some(Command::List) => commands::list(config).await?,
    }

    Ok(())
}
