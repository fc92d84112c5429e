use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ValidationError;

/// 评测题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// 题号，拼接进 `problem/<id>` 路径
    #[serde(deserialize_with = "deserialize_problem_id")]
    pub id: String,
}

impl Problem {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// 从调用方传入的 JSON 校验并解析
    pub fn from_value(value: &JsonValue) -> Result<Self, ValidationError> {
        let problem: Problem =
            Problem::deserialize(value).map_err(|_| ValidationError::InvalidProblem)?;
        problem.validate()?;
        Ok(problem)
    }

    /// 题号非空，且只含字母、数字、`-`、`_`
    pub fn validate(&self) -> Result<(), ValidationError> {
        let well_formed = !self.id.is_empty()
            && self
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if well_formed {
            Ok(())
        } else {
            Err(ValidationError::InvalidProblem)
        }
    }
}

/// 源文件引用，由 [`SourceResolver`](crate::services::SourceResolver) 解析为路径
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(pub String);

impl FileRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 待评测的解答
///
/// `language` 保留原始标签：未知语言应当报告为 "Language rejected"，
/// 而不是结构错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub language: String,
    pub file: FileRef,
}

impl Solution {
    pub fn new(language: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            file: FileRef(file.into()),
        }
    }

    /// 从调用方传入的 JSON 校验并解析
    pub fn from_value(value: &JsonValue) -> Result<Self, ValidationError> {
        let solution: Solution =
            Solution::deserialize(value).map_err(|_| ValidationError::InvalidSolution)?;
        solution.validate()?;
        Ok(solution)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.language.is_empty() || self.file.0.is_empty() {
            return Err(ValidationError::InvalidSolution);
        }
        Ok(())
    }
}

// 题号既可能是字符串也可能是整数
fn deserialize_problem_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct ProblemIdVisitor;

    impl<'de> Visitor<'de> for ProblemIdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or non-negative integer problem id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(ProblemIdVisitor)
}
