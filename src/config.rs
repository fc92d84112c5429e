use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 评测机地址，总是以 `/` 结尾
    pub uoj_addr: String,
    /// 账号
    pub username: String,
    /// 密码
    pub password: String,
    /// 只有登录后才会出现在 `user/msg` 页面上的文本
    pub auth_marker: String,
    /// 已运行浏览器的调试端口；为空时自行启动浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 是否无头模式启动
    pub headless: bool,
    /// 两轮轮询之间的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 同一轮中同时进行的结果查询数
    pub max_in_flight_fetches: usize,
    /// 连续查询失败多少次后放弃该提交
    pub max_consecutive_failures: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uoj_addr: "http://localhost/".to_string(),
            username: String::new(),
            password: String::new(),
            auth_marker: "私信".to_string(),
            browser_debug_port: None,
            chrome_executable: None,
            headless: true,
            poll_interval_ms: 1000,
            max_in_flight_fetches: 1,
            max_consecutive_failures: 30,
            verbose_logging: false,
            output_log_file: "judge.log".to_string(),
        }
    }
}

impl Config {
    /// 只从环境变量读取，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件，再用环境变量覆盖
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        config.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let config = Self {
            uoj_addr: env_string("UOJ_ADDR").unwrap_or(self.uoj_addr),
            username: env_string("UOJ_USERNAME").unwrap_or(self.username),
            password: env_string("UOJ_PASSWORD").unwrap_or(self.password),
            auth_marker: env_string("UOJ_AUTH_MARKER").unwrap_or(self.auth_marker),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", "u16")?.or(self.browser_debug_port),
            chrome_executable: env_string("CHROME_EXECUTABLE").or(self.chrome_executable),
            headless: env_parse("HEADLESS", "bool")?.unwrap_or(self.headless),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS", "u64")?.unwrap_or(self.poll_interval_ms),
            max_in_flight_fetches: env_parse("MAX_IN_FLIGHT_FETCHES", "usize")?
                .unwrap_or(self.max_in_flight_fetches),
            max_consecutive_failures: env_parse("MAX_CONSECUTIVE_FAILURES", "u32")?
                .unwrap_or(self.max_consecutive_failures),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        };
        Ok(config.normalized())
    }

    /// 地址补全结尾的 `/`，并发数至少为 1
    pub fn normalized(mut self) -> Self {
        if !self.uoj_addr.ends_with('/') {
            self.uoj_addr.push('/');
        }
        self.max_in_flight_fetches = self.max_in_flight_fetches.max(1);
        self
    }

    /// 检查登录所需的必填项
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::Missing("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("password"));
        }
        Ok(())
    }

    /// 拼接评测机上的页面地址
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.uoj_addr, path.strip_prefix('/').unwrap_or(path))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
    }
}
