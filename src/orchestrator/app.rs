//! 应用生命周期 - 编排层
//!
//! 持有浏览器驱动和后台轮询任务，是唯一接触进程级资源的模块。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::WebDriver;
use crate::models::{FileRef, JudgeResult, Problem, Solution};
use crate::orchestrator::judge::Orchestrator;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    orchestrator: Orchestrator,
    poller: JoinHandle<()>,
    stop: oneshot::Sender<()>,
}

impl App {
    /// 初始化应用：日志文件、浏览器、轮询循环
    pub async fn initialize(config: Config) -> Result<Self> {
        config.require_credentials()?;
        logging::log_startup(&config);

        let driver: Arc<dyn WebDriver> = Arc::new(
            browser::start_driver(&config)
                .await
                .context("无法启动浏览器")?,
        );

        let (orchestrator, poll_loop) = Orchestrator::with_driver(driver, Arc::new(config));

        let (stop, stop_rx) = oneshot::channel();
        let poller = tokio::spawn(poll_loop.run(async move {
            let _ = stop_rx.await;
        }));

        Ok(Self {
            orchestrator,
            poller,
            stop,
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// 提交一个本地文件并等待终态
    pub async fn run(self, problem_id: &str, language: &str, file: &str) -> Result<JudgeResult> {
        let resolver =
            |file: &FileRef| -> Result<PathBuf, AppError> { Ok(PathBuf::from(file.as_str())) };

        let handle = self
            .orchestrator
            .handle(
                &Problem::new(problem_id),
                &Solution::new(language, file),
                &resolver,
            )
            .await;

        let mut last = None;
        handle
            .forward(|result| {
                logging::log_update(&result);
                last = Some(result);
            })
            .await;

        self.shutdown().await;
        last.context("没有收到评测结果")
    }

    /// 停止轮询循环
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        let _ = self.poller.await;
        info!("应用已停止");
    }
}
