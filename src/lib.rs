//! # UOJ Remote Judge
//!
//! 把解答提交到远程 UOJ 评测机，并持续跟踪评测结果
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器，只暴露"打开页面、执行脚本"的能力
//! - `WebDriver` / `BrowsingContext` - 驱动抽象，测试中可替换
//!
//! ### ② 业务能力层（Services）
//! - `SessionManager` - 登录状态探测与登录
//! - `SubmissionSubmitter` - 提交源码并找回运行编号
//! - `ResultFetcher` - 抓取单个提交的评测详情
//! - `interpret` - 把评测机文本翻译成统一状态
//!
//! ### ③ 流程层（Workflow）
//! - `PollLoop` - 周期性地轮询所有未完成的提交
//! - `SubmissionHandle` - 调用方接收中间状态与终态
//!
//! ### ④ 编排层（Orchestration）
//! - `Orchestrator` - 单次提交的完整流程
//! - `App` - 进程级资源的生命周期
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::start_driver;
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::{BrowsingContext, ChromeDriver, WebDriver};
pub use models::{FileRef, JudgeResult, JudgeStatus, Language, Problem, RunId, Solution};
pub use orchestrator::{App, Orchestrator};
pub use workflow::{PollLoop, PollSettings, SubmissionHandle};
