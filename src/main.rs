use std::env;

use anyhow::{bail, Context, Result};
use uoj_remote_judge::utils::logging;
use uoj_remote_judge::{App, Config};

const USAGE: &str = "用法: uoj-remote-judge <problem-id> <language> <file>";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let [problem_id, language, file] = args.as_slice() else {
        bail!("{}", USAGE);
    };

    // 加载配置：UOJ_CONFIG 指向 toml 文件时优先使用，环境变量始终可以覆盖
    let config = match env::var("UOJ_CONFIG") {
        Ok(path) => Config::from_toml_file(&path)?,
        Err(_) => Config::from_env()?,
    };

    // 初始化日志
    logging::init(&config)?;

    // 初始化并运行应用
    let result = App::initialize(config)
        .await?
        .run(problem_id, language, file)
        .await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("无法序列化评测结果")?
    );
    Ok(())
}
