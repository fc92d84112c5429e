//! 评测状态归一化
//!
//! 把页面上的自由文本映射到封闭的状态集合。这是一个全函数：
//! 任何无法识别的输入都落到 `OtherError`，保证轮询总能向前推进。

use std::sync::LazyLock;

use regex::Regex;

use crate::models::JudgeStatus;

// 与页面显示一致：去掉前导空白后取开头的整数
static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("static pattern"));

/// 归一化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub status: JudgeStatus,
    pub score: u8,
}

/// 根据状态文本和分数文本得出归一化状态
///
/// 分数能解析为 0..=100 的整数时优先：满分为 `Accepted`，否则 `OtherError`。
/// 否则按状态文本匹配，分数记 0。
pub fn interpret(status_text: &str, score_text: &str) -> Verdict {
    if let Some(score) = parse_score(score_text) {
        let status = if score == 100 {
            JudgeStatus::Accepted
        } else {
            JudgeStatus::OtherError
        };
        return Verdict { status, score };
    }

    let status = match status_text.trim() {
        "Waiting" | "Waiting Rejudge" => JudgeStatus::WaitingJudge,
        "Compiling" | "Judging" => JudgeStatus::Judging,
        "Compile Error" => JudgeStatus::CompileError,
        "Judgement Failed" => JudgeStatus::JudgementFailed,
        _ => JudgeStatus::OtherError,
    };
    Verdict { status, score: 0 }
}

fn parse_score(text: &str) -> Option<u8> {
    let digits = LEADING_INT.captures(text)?.get(1)?.as_str();
    let value: i64 = digits.parse().ok()?;
    u8::try_from(value).ok().filter(|score| *score <= 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(status: JudgeStatus, score: u8) -> Verdict {
        Verdict { status, score }
    }

    #[test]
    fn test_numeric_scores() {
        assert_eq!(interpret("100", "100"), verdict(JudgeStatus::Accepted, 100));
        assert_eq!(interpret("42", "42"), verdict(JudgeStatus::OtherError, 42));
        assert_eq!(interpret("0", "0"), verdict(JudgeStatus::OtherError, 0));
        // 分数优先于状态文本
        assert_eq!(interpret("Judging", "100"), verdict(JudgeStatus::Accepted, 100));
    }

    #[test]
    fn test_score_text_like_the_page_shows_it() {
        assert_eq!(interpret("", " 85 "), verdict(JudgeStatus::OtherError, 85));
        assert_eq!(interpret("", "70pts"), verdict(JudgeStatus::OtherError, 70));
        assert_eq!(interpret("", "+100"), verdict(JudgeStatus::Accepted, 100));
    }

    #[test]
    fn test_out_of_range_scores_fall_through() {
        assert_eq!(interpret("Judging", "101"), verdict(JudgeStatus::Judging, 0));
        assert_eq!(interpret("Waiting", "-1"), verdict(JudgeStatus::WaitingJudge, 0));
        assert_eq!(
            interpret("???", "99999999999999999999999"),
            verdict(JudgeStatus::OtherError, 0)
        );
    }

    #[test]
    fn test_status_vocabulary() {
        let cases = [
            ("Waiting", JudgeStatus::WaitingJudge),
            ("Waiting Rejudge", JudgeStatus::WaitingJudge),
            ("Compiling", JudgeStatus::Judging),
            ("Judging", JudgeStatus::Judging),
            ("Compile Error", JudgeStatus::CompileError),
            ("Judgement Failed", JudgeStatus::JudgementFailed),
            ("???", JudgeStatus::OtherError),
            ("", JudgeStatus::OtherError),
            ("waiting", JudgeStatus::OtherError),
        ];
        for (text, expected) in cases {
            assert_eq!(interpret(text, text), verdict(expected, 0), "status text {:?}", text);
        }
    }

    #[test]
    fn test_score_only_in_range_for_numeric_input() {
        let inputs = ["", "abc", "Judging", "12abc", "1e3", "-0", "100.0", "  7", "中文"];
        for text in inputs {
            let v = interpret(text, text);
            assert!(v.score <= 100);
            if parse_score(text).is_none() {
                assert_eq!(v.score, 0, "non-numeric {:?}", text);
            }
        }
    }
}
