use serde::{Deserialize, Serialize};

/// 评测机分配的运行编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 归一化后的评测状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgeStatus {
    WaitingJudge,
    Judging,
    Accepted,
    CompileError,
    JudgementFailed,
    OtherError,
}

impl JudgeStatus {
    /// 终态之后评测结果不会再变化
    pub fn is_terminal(self) -> bool {
        !matches!(self, JudgeStatus::WaitingJudge | JudgeStatus::Judging)
    }
}

/// 附加诊断信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 交付给调用方的评测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub status: JudgeStatus,
    /// 0..=100，非数值结果为 0
    pub score: u8,
    #[serde(default)]
    pub details: ResultDetails,
}

impl JudgeResult {
    /// 失败结果，错误文本放入 `details.error`
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JudgeStatus::JudgementFailed,
            score: 0,
            details: ResultDetails {
                error: Some(error.into()),
                ..Default::default()
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl std::fmt::Display for JudgeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self.status, self.score)?;
        if let Some(time) = &self.details.time {
            write!(f, " time={}", time)?;
        }
        if let Some(memory) = &self.details.memory {
            write!(f, " memory={}", memory)?;
        }
        if let Some(error) = &self.details.error {
            write!(f, " error={}", error)?;
        }
        Ok(())
    }
}
