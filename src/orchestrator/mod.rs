//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `judge` - 提交入口
//! - 校验题目与解答
//! - 确保会话可用
//! - 解析源文件并提交
//! - 把运行编号登记到轮询循环
//!
//! ### `app` - 应用生命周期
//! - 启动浏览器
//! - 启动、停止后台轮询循环
//!
//! ## 层次关系
//!
//! ```text
//! app (进程级资源)
//!     ↓
//! judge::Orchestrator (处理单次提交)
//!     ↓
//! workflow::PollLoop (跟踪所有未完成的提交)
//!     ↓
//! services (能力层：session / submitter / fetcher / status_interpreter)
//!     ↓
//! infrastructure (基础设施：WebDriver)
//! ```

pub mod app;
pub mod judge;

pub use app::App;
pub use judge::Orchestrator;
