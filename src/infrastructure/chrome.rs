//! 基于 chromiumoxide 的 WebDriver 实现
//!
//! 每个浏览上下文对应一个标签页（Page）。

use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, Page};
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::DriverError;
use crate::infrastructure::driver::{BrowsingContext, PageResponse, WebDriver};

/// 当前文档的 HTTP 状态码
///
/// 旧版本 Chromium 没有 `responseStatus`，此时按 200 处理。
const NAVIGATION_STATUS: &str = r#"
    (() => {
        const entry = performance.getEntriesByType("navigation")[0];
        return (entry && entry.responseStatus) || 200;
    })()
"#;

/// 持有浏览器进程（或连接）的驱动
pub struct ChromeDriver {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromeDriver {
    /// `handler_task` 是处理浏览器事件的后台任务，随驱动一起结束
    pub fn new(browser: Browser, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser,
            handler_task,
        }
    }
}

#[async_trait]
impl WebDriver for ChromeDriver {
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, DriverError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::OpenFailed(e.to_string()))?;
        debug!("已打开新标签页");
        Ok(Box::new(ChromeContext::new(page)))
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// 标签页形式的浏览上下文
pub struct ChromeContext {
    page: Page,
}

impl ChromeContext {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval_expression(&self, expression: String) -> Result<JsonValue, DriverError> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(DriverError::ScriptFailed)?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }
}

#[async_trait]
impl BrowsingContext for ChromeContext {
    async fn goto(&mut self, url: &str) -> Result<PageResponse, DriverError> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = self
            .eval_expression(NAVIGATION_STATUS.to_string())
            .await?
            .as_u64()
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or(200);
        let body = self.page.content().await?;

        Ok(PageResponse { status, body })
    }

    async fn evaluate(
        &self,
        script: &str,
        args: Vec<JsonValue>,
    ) -> Result<JsonValue, DriverError> {
        // 参数以 JSON 字面量拼进调用表达式
        let args = args
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.eval_expression(format!("({})({})", script.trim(), args))
            .await
    }

    async fn wait_for_navigation(&self) -> Result<(), DriverError> {
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.page.close().await?;
        Ok(())
    }
}
