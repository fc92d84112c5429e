//! 提交入口 - 编排层
//!
//! ## 职责
//!
//! 校验请求、确保会话可用、解析源文件、提交，最后把运行编号登记到轮询循环。
//!
//! 每次调用的结果只有两种：登记成功（之后由轮询循环交付结果），
//! 或者立即交付一次 `JudgementFailed`。调用方永远拿不到原始错误。

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, ValidationError};
use crate::infrastructure::WebDriver;
use crate::models::{JudgeResult, Language, Problem, RunId, Solution};
use crate::services::{
    load_source, ResultFetcher, SessionManager, SourceResolver, SubmissionSubmitter,
};
use crate::workflow::{submission_channel, PollLoop, PollSettings, Registrar, SubmissionHandle};

/// 提交入口
pub struct Orchestrator {
    session: Arc<Mutex<SessionManager>>,
    submitter: SubmissionSubmitter,
    registrar: Registrar,
}

impl Orchestrator {
    pub fn new(
        session: Arc<Mutex<SessionManager>>,
        submitter: SubmissionSubmitter,
        registrar: Registrar,
    ) -> Self {
        Self {
            session,
            submitter,
            registrar,
        }
    }

    /// 用同一个驱动组装全部组件
    ///
    /// 返回的轮询循环需要由调用方启动。
    pub fn with_driver(
        driver: Arc<dyn WebDriver>,
        config: Arc<Config>,
    ) -> (Self, PollLoop<ResultFetcher>) {
        let fetcher = Arc::new(ResultFetcher::new(Arc::clone(&driver), Arc::clone(&config)));
        let (poll_loop, registrar) = PollLoop::new(fetcher, PollSettings::from_config(&config));

        let session = SessionManager::new(Arc::clone(&driver), Arc::clone(&config));
        let submitter = SubmissionSubmitter::new(driver, config);
        let orchestrator = Self::new(Arc::new(Mutex::new(session)), submitter, registrar);
        (orchestrator, poll_loop)
    }

    /// 接收未经校验的 JSON 请求
    pub async fn handle_raw(
        &self,
        problem: &JsonValue,
        solution: &JsonValue,
        resolver: &dyn SourceResolver,
    ) -> SubmissionHandle {
        let parsed = Problem::from_value(problem)
            .and_then(|problem| Solution::from_value(solution).map(|solution| (problem, solution)));

        match parsed {
            Ok((problem, solution)) => self.handle(&problem, &solution, resolver).await,
            Err(e) => {
                warn!("请求格式错误: {}", e);
                failed_handle(e.to_string())
            }
        }
    }

    /// 提交一份解答
    ///
    /// 返回的句柄上会先收到若干中间状态，最后恰好一次终态。
    pub async fn handle(
        &self,
        problem: &Problem,
        solution: &Solution,
        resolver: &dyn SourceResolver,
    ) -> SubmissionHandle {
        let (sink, handle) = submission_channel();

        match self.process(problem, solution, resolver).await {
            Ok(run_id) => match self.registrar.register(run_id, sink) {
                Ok(()) => info!("题目 {} 的提交 {} 已登记，等待评测", problem.id, run_id),
                Err(sink) => {
                    error!("轮询循环已停止，无法跟踪提交 {}", run_id);
                    sink.finish(JudgeResult::failed("Tracking stopped"));
                }
            },
            Err(e) => {
                error!("❌ 题目 {} 提交失败: {}", problem.id, e);
                sink.finish(JudgeResult::failed(diagnostic(&e)));
            }
        }

        handle
    }

    async fn process(
        &self,
        problem: &Problem,
        solution: &Solution,
        resolver: &dyn SourceResolver,
    ) -> Result<RunId, AppError> {
        problem.validate()?;
        solution.validate()?;

        // 持锁直到提交结束，避免并发提交与重新登录交错
        let mut session = self.session.lock().await;
        session.ensure_live().await?;

        let language =
            Language::from_tag(&solution.language).ok_or(ValidationError::LanguageRejected)?;

        let path = resolver.resolve(&solution.file).await?;
        let source = load_source(&path).await?;

        let submitted = self
            .submitter
            .submit(&problem.id, &source, language.judge_label())
            .await;

        match submitted {
            Ok(run_id) => Ok(run_id),
            Err(e) => {
                // 提交失败可能是登录过期，探活一次，失效则下次提交时重新登录
                if !session.is_live().await {
                    warn!("提交失败后探活未通过");
                }
                Err(e.into())
            }
        }
    }
}

fn failed_handle(error: String) -> SubmissionHandle {
    let (sink, handle) = submission_channel();
    sink.finish(JudgeResult::failed(error));
    handle
}

/// 交付给调用方的错误文本
fn diagnostic(error: &AppError) -> String {
    match error {
        AppError::Validation(e) => e.to_string(),
        AppError::Auth(e) => e.to_string(),
        _ => ValidationError::InvalidSolution.to_string(),
    }
}
