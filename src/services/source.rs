//! 源文件解析 - 业务能力层

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, ValidationError};
use crate::models::FileRef;

/// 源文件大小上限：16 MiB
pub const MAX_SOURCE_SIZE: u64 = 16 * 1024 * 1024;

/// 把调用方的文件引用解析为本地路径
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, file: &FileRef) -> Result<PathBuf, AppError>;
}

#[async_trait]
impl<F> SourceResolver for F
where
    F: Fn(&FileRef) -> Result<PathBuf, AppError> + Send + Sync,
{
    async fn resolve(&self, file: &FileRef) -> Result<PathBuf, AppError> {
        self(file)
    }
}

/// 文件引用是某个根目录下的相对路径
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceResolver for DirectoryResolver {
    async fn resolve(&self, file: &FileRef) -> Result<PathBuf, AppError> {
        let relative = Path::new(file.as_str());
        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(AppError::Source(format!("{} is outside the source root", file)));
        }
        Ok(self.root.join(relative))
    }
}

/// 读取源文件
///
/// 恰好 16 MiB 的文件可以提交，超过一个字节即拒绝。
pub async fn load_source(path: &Path) -> Result<String, AppError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| AppError::Source(format!("{}: {}", path.display(), e)))?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(ValidationError::FileTooBig {
            size: metadata.len(),
        }
        .into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Source(format!("{}: {}", path.display(), e)))?;
    debug!("读取源文件 {} ({} 字节)", path.display(), bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
