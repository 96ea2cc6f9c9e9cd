pub mod commands;

use crate::config::Config;
use crate::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// housing-predictor CLI
#[derive(Parser)]
#[command(name = "housing-predictor")]
#[command(about = "Train and serve a home sale-price model enriched with zipcode demographics")]
#[command(version)]
pub struct Cli {
    /// 配置文件路径（TOML），环境变量 HOUSING_* 会覆盖其中的值
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI 命令
#[derive(Subcommand)]
pub enum Command {
    /// 启动 HTTP 服务器（默认）
    Serve,
    /// 训练模型并写出产物
    Train {
        /// 发布到本地注册表的下一个版本，而不是配置的产物位置
        #[arg(long)]
        register: bool,
    },
    /// 对 JSON 文件中的记录做一次本地预测
    Predict {
        /// 单个对象或对象数组
        input: PathBuf,
        /// 按基础形态校验
        #[arg(long)]
        basic: bool,
    },
    /// 列出注册表中的模型版本
    List,
}

impl Cli {
    /// 读取配置：指定文件时以文件为底，否则只用默认值和环境变量
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Config::from_env(),
        }
    }
}
