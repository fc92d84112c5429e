//! 错误类型
//!
//! 每一类失败对应一个枚举：登录、提交、查询结果、请求校验、浏览器。
//! 这些错误的 `Display` 文本会原样写入结果的 `details.error`，
//! 所以保持英文、简短。

use thiserror::Error;

use crate::models::RunId;

/// 浏览器（WebDriver）层错误
#[derive(Debug, Error)]
pub enum DriverError {
    /// 打开浏览上下文失败
    #[error("Failed to open browsing context: {0}")]
    OpenFailed(String),
    /// 导航失败
    #[error("Navigation to {url} failed: {message}")]
    NavigationFailed { url: String, message: String },
    /// 执行脚本失败
    #[error("Script execution failed: {0}")]
    ScriptFailed(String),
    /// 浏览器启动 / 连接失败
    #[error("Browser unavailable: {0}")]
    Unavailable(String),
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverError::ScriptFailed(err.to_string())
    }
}

/// 登录错误
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// 登录页上找不到输入框
    #[error("Login form not found")]
    FormNotFound,
    /// 登录后探活仍然失败
    #[error("Login failed")]
    Rejected,
}

/// 提交错误
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// 找不到提交按钮、语言选择框或代码编辑框
    #[error("Submit control not found")]
    ControlNotFound,
    /// 提交记录列表中没有属于当前账号的行
    #[error("No submission by {username} in the results listing")]
    NoOwnRun { username: String },
    /// 运行编号无法解析
    #[error("Unparsable run id: {0:?}")]
    BadRunId(String),
}

/// 查询评测结果错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// 提交记录不存在
    #[error("Submission {0} not found")]
    NotFound(RunId),
    /// 非 200 响应
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
    /// 详情表格缺少字段
    #[error("Missing field {0:?} on submission page")]
    MissingField(&'static str),
}

impl FetchError {
    /// 是否值得在下一轮重试
    ///
    /// 只有明确不存在的提交记录被视为永久失败。
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::NotFound(_))
    }
}

/// 请求校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid problem")]
    InvalidProblem,
    #[error("Invalid solution")]
    InvalidSolution,
    #[error("Language rejected")]
    LanguageRejected,
    #[error("File is too big")]
    FileTooBig { size: u64 },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("Environment variable {var_name}={value:?} is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 配置文件读取失败
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 缺少必填项
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 源文件解析 / 读取失败
    #[error("Source unavailable: {0}")]
    Source(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 应用程序结果类型
pub type Result<T, E = AppError> = std::result::Result<T, E>;
