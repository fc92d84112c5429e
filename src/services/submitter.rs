//! 提交服务 - 业务能力层
//!
//! 通过题目页的提交表单提交代码，再从提交记录列表中找回运行编号。
//!
//! 提交记录列表是所有用户共享的。找回编号时取第一条属于当前账号的记录，
//! 默认新提交会出现在最上方；如果新记录尚未渲染，而更早的一条本账号记录
//! 排在前面，就会取到旧编号。这是从共享列表抓取编号的固有竞态，目前不做处理。

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::SubmitError;
use crate::infrastructure::driver::{release, BrowsingContext, WebDriver};
use crate::infrastructure::scripts;
use crate::models::RunId;

/// 提交记录列表中的一行
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingRow {
    /// 行的 class，`info` 表示表头/提示行
    #[serde(default)]
    pub class: Option<String>,
    /// 各列文本：编号、题目、用户、结果……
    #[serde(default)]
    pub cells: Vec<String>,
}

impl ListingRow {
    fn is_marker(&self) -> bool {
        self.class.as_deref() == Some("info")
    }

    fn user(&self) -> Option<&str> {
        self.cells.get(2).map(|cell| cell.trim())
    }
}

/// 提交服务
pub struct SubmissionSubmitter {
    driver: Arc<dyn WebDriver>,
    config: Arc<Config>,
}

impl SubmissionSubmitter {
    pub fn new(driver: Arc<dyn WebDriver>, config: Arc<Config>) -> Self {
        Self { driver, config }
    }

    /// 提交代码，返回评测机分配的运行编号
    ///
    /// # 参数
    /// - `problem_id`: 题号
    /// - `source`: 源代码
    /// - `language_label`: 提交页语言选择框中的值
    pub async fn submit(
        &self,
        problem_id: &str,
        source: &str,
        language_label: &str,
    ) -> Result<RunId, SubmitError> {
        info!(
            "📤 提交题目 {} (语言: {}, 代码长度: {})",
            problem_id,
            language_label,
            source.len()
        );

        let mut ctx = self.driver.open_context().await?;
        let outcome = self
            .submit_in(ctx.as_mut(), problem_id, source, language_label)
            .await;
        release(ctx).await;

        let run_id = outcome?;
        info!("✓ 题目 {} 提交成功，运行编号 {}", problem_id, run_id);
        Ok(run_id)
    }

    async fn submit_in(
        &self,
        ctx: &mut dyn BrowsingContext,
        problem_id: &str,
        source: &str,
        language_label: &str,
    ) -> Result<RunId, SubmitError> {
        ctx.goto(&self.config.url(&format!("problem/{}", problem_id)))
            .await?;

        let submitted: bool = ctx
            .evaluate_as(
                scripts::SUBMIT_FORM,
                vec![json!(language_label), json!(source)],
            )
            .await?;
        if !submitted {
            return Err(SubmitError::ControlNotFound);
        }

        ctx.wait_for_navigation().await?;

        let rows: Vec<ListingRow> = ctx
            .evaluate_as(scripts::RESULTS_LISTING, Vec::new())
            .await?;
        debug!("提交记录列表共 {} 行", rows.len());

        find_own_run_id(&rows, &self.config.username)
    }
}

/// 自上而下找到第一条属于 `username` 的记录，返回其运行编号
pub fn find_own_run_id(rows: &[ListingRow], username: &str) -> Result<RunId, SubmitError> {
    rows.iter()
        .filter(|row| !row.is_marker())
        .find(|row| row.user() == Some(username))
        .map(|row| parse_run_id(row.cells.first().map(String::as_str).unwrap_or_default()))
        .unwrap_or_else(|| {
            Err(SubmitError::NoOwnRun {
                username: username.to_string(),
            })
        })
}

/// 解析 `#1234` 形式的编号
pub fn parse_run_id(text: &str) -> Result<RunId, SubmitError> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('#')
        .unwrap_or(trimmed)
        .parse::<u64>()
        .map(RunId)
        .map_err(|_| SubmitError::BadRunId(text.to_string()))
}
