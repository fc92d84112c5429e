//! 浏览器启动与连接

pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

use crate::config::Config;
use crate::error::DriverError;
use crate::infrastructure::ChromeDriver;

/// 按配置连接已运行的浏览器，或自行启动一个
pub async fn start_driver(config: &Config) -> Result<ChromeDriver, DriverError> {
    let (browser, handler_task) = match config.browser_debug_port {
        Some(port) => connect_to_browser(port).await?,
        None => launch_browser(config.headless, config.chrome_executable.as_deref()).await?,
    };
    Ok(ChromeDriver::new(browser, handler_task))
}
