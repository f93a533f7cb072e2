use std::path::PathBuf;

use anyhow::Result;
use neet_quiz_gen::app::App;
use neet_quiz_gen::config::Config;
use neet_quiz_gen::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 命令行参数即资料文件路径
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    // 初始化并运行应用
    App::initialize(config)?.run(paths).await?;

    Ok(())
}
