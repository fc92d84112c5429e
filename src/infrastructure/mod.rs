//! 基础设施层
//!
//! 持有浏览器这一稀缺资源，只对上层暴露"打开页面、执行脚本"的能力。

pub mod chrome;
pub mod driver;
pub mod scripts;

pub use chrome::{ChromeContext, ChromeDriver};
pub use driver::{BrowsingContext, PageResponse, WebDriver};
