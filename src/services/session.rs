//! 登录会话管理 - 业务能力层
//!
//! 进程内只维护一个账号的会话。会话在第一次提交时才建立，
//! 之后默认一直有效，直到某次探活失败。

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AuthError;
use crate::infrastructure::driver::{release, BrowsingContext, WebDriver};
use crate::infrastructure::scripts;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 尚未登录
    Absent,
    /// 已登录
    Live,
    /// 曾经登录，但探活失败
    Invalid,
}

/// 会话管理器
///
/// 唯一可以修改会话状态的组件。并发使用时需放在互斥锁之后，
/// 避免两次提交同时触发重新登录。
pub struct SessionManager {
    driver: Arc<dyn WebDriver>,
    config: Arc<Config>,
    state: SessionState,
}

impl SessionManager {
    pub fn new(driver: Arc<dyn WebDriver>, config: Arc<Config>) -> Self {
        Self {
            driver,
            config,
            state: SessionState::Absent,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 当前账号
    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// 标记会话失效，下次 `ensure_live` 会重新登录
    pub fn invalidate(&mut self) {
        if self.state == SessionState::Live {
            warn!("会话已失效，下次提交时重新登录");
            self.state = SessionState::Invalid;
        }
    }

    /// 确保会话可用
    ///
    /// 已登录的会话不会再次探活。
    pub async fn ensure_live(&mut self) -> Result<(), AuthError> {
        if self.state == SessionState::Live {
            return Ok(());
        }

        let config = Arc::clone(&self.config);
        match self.login(&config.username, &config.password).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = SessionState::Invalid;
                Err(e)
            }
        }
    }

    /// 探活：打开需要登录的页面，检查状态码和登录后才有的标记
    ///
    /// 任何导航失败都视为未登录。
    pub async fn is_live(&mut self) -> bool {
        let live = self.probe().await;
        if live {
            self.state = SessionState::Live;
        } else {
            self.invalidate();
        }
        live
    }

    /// 登录并在登录后重新探活
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        info!("🔐 正在登录评测机: {}", username);

        let mut ctx = self.driver.open_context().await?;
        let outcome =
            fill_login_form(ctx.as_mut(), &self.config.url("login"), username, password).await;
        release(ctx).await;
        outcome?;

        if !self.is_live().await {
            warn!("登录后探活失败");
            return Err(AuthError::Rejected);
        }

        info!("✓ 登录成功");
        Ok(())
    }

    async fn probe(&self) -> bool {
        let mut ctx = match self.driver.open_context().await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("探活时无法打开页面: {}", e);
                return false;
            }
        };
        let outcome = ctx.goto(&self.config.url("user/msg")).await;
        release(ctx).await;

        match outcome {
            Ok(page) => {
                let live = page.is_ok() && page.body.contains(&self.config.auth_marker);
                debug!("探活结果: status={}, live={}", page.status, live);
                live
            }
            Err(e) => {
                debug!("探活失败: {}", e);
                false
            }
        }
    }
}

async fn fill_login_form(
    ctx: &mut dyn BrowsingContext,
    login_url: &str,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    ctx.goto(login_url).await?;
    let filled: bool = ctx
        .evaluate_as(scripts::LOGIN_FORM, vec![json!(username), json!(password)])
        .await?;
    if !filled {
        return Err(AuthError::FormNotFound);
    }
    ctx.wait_for_navigation().await?;
    Ok(())
}
