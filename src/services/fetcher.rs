//! 评测结果查询 - 业务能力层

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::infrastructure::driver::{release, BrowsingContext, WebDriver};
use crate::infrastructure::scripts;
use crate::models::{JudgeResult, ResultDetails, RunId};
use crate::services::status_interpreter::interpret;

/// 评测结果来源
///
/// 轮询循环只依赖这个 trait。
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn fetch(&self, run_id: RunId) -> Result<JudgeResult, FetchError>;
}

/// 提交详情页上读到的原始字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailFields {
    pub status: Option<String>,
    pub score: Option<String>,
    pub time: Option<String>,
    pub memory: Option<String>,
}

impl DetailFields {
    /// 归一化为评测结果，缺少字段时报错
    pub fn into_result(self) -> Result<JudgeResult, FetchError> {
        let status_text = self.status.ok_or(FetchError::MissingField("status"))?;
        let time = self.time.ok_or(FetchError::MissingField("time"))?;
        let memory = self.memory.ok_or(FetchError::MissingField("memory"))?;
        let score_text = self.score.unwrap_or_else(|| status_text.clone());

        let verdict = interpret(&status_text, &score_text);
        Ok(JudgeResult {
            status: verdict.status,
            score: verdict.score,
            details: ResultDetails {
                time: Some(time),
                memory: Some(memory),
                error: None,
            },
        })
    }
}

/// 从提交详情页读取评测结果
pub struct ResultFetcher {
    driver: Arc<dyn WebDriver>,
    config: Arc<Config>,
}

impl ResultFetcher {
    pub fn new(driver: Arc<dyn WebDriver>, config: Arc<Config>) -> Self {
        Self { driver, config }
    }

    async fn fetch_in(
        &self,
        ctx: &mut dyn BrowsingContext,
        run_id: RunId,
    ) -> Result<JudgeResult, FetchError> {
        let page = ctx
            .goto(&self.config.url(&format!("submission/{}", run_id.0)))
            .await?;
        match page.status {
            200 => {}
            404 => return Err(FetchError::NotFound(run_id)),
            other => return Err(FetchError::HttpStatus(other)),
        }

        let fields: DetailFields = ctx
            .evaluate_as(scripts::SUBMISSION_DETAIL, Vec::new())
            .await?;
        debug!("提交 {} 详情: {:?}", run_id, fields);

        fields.into_result()
    }
}

#[async_trait]
impl ResultSource for ResultFetcher {
    async fn fetch(&self, run_id: RunId) -> Result<JudgeResult, FetchError> {
        let mut ctx = self.driver.open_context().await?;
        let outcome = self.fetch_in(ctx.as_mut(), run_id).await;
        release(ctx).await;
        outcome
    }
}
