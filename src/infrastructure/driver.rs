//! WebDriver 抽象
//!
//! 上层的登录、提交、查询都只依赖这两个 trait，
//! 不认识具体的浏览器实现。

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::DriverError;

/// 一次导航得到的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 页面文本（HTML）
    pub body: String,
}

impl PageResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// 一个独立的浏览上下文（一个标签页）
///
/// 每次操作打开一个，用完必须调用且只调用一次 [`close`](BrowsingContext::close)，
/// 包括操作失败的情况。
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    /// 导航到指定地址
    async fn goto(&mut self, url: &str) -> Result<PageResponse, DriverError>;

    /// 在页面中执行 `script`（一个 JS 函数表达式），参数按 JSON 传入
    async fn evaluate(&self, script: &str, args: Vec<JsonValue>)
        -> Result<JsonValue, DriverError>;

    /// 等待由页面脚本触发的导航完成
    async fn wait_for_navigation(&self) -> Result<(), DriverError>;

    /// 关闭上下文
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

impl<'a> dyn BrowsingContext + 'a {
    /// 执行脚本并反序列化为指定类型
    pub async fn evaluate_as<T: DeserializeOwned>(
        &self,
        script: &str,
        args: Vec<JsonValue>,
    ) -> Result<T, DriverError> {
        let value = self.evaluate(script, args).await?;
        serde_json::from_value(value).map_err(|e| DriverError::ScriptFailed(e.to_string()))
    }
}

/// 浏览器能力：打开新的浏览上下文
#[async_trait]
pub trait WebDriver: Send + Sync {
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, DriverError>;
}

/// 关闭上下文，失败只记日志
///
/// 关闭失败不应掩盖操作本身的结果。
pub async fn release(ctx: Box<dyn BrowsingContext>) {
    if let Err(e) = ctx.close().await {
        tracing::warn!("关闭浏览上下文失败: {}", e);
    }
}
