/// 评测语言
///
/// 只接受固定的几种语言，标签到评测机下拉框选项的映射也是固定的。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp98,
    Cpp11,
    Java,
    Python3,
    Python2,
}

impl Language {
    /// 从调用方的语言标签解析，不在白名单内返回 None
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "c" => Some(Language::C),
            "cpp98" => Some(Language::Cpp98),
            "cpp11" => Some(Language::Cpp11),
            "java" => Some(Language::Java),
            "python3" => Some(Language::Python3),
            "python2" => Some(Language::Python2),
            _ => None,
        }
    }

    /// 调用方使用的标签
    pub fn tag(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp98 => "cpp98",
            Language::Cpp11 => "cpp11",
            Language::Java => "java",
            Language::Python3 => "python3",
            Language::Python2 => "python2",
        }
    }

    /// 评测机提交页语言选择框中的值
    pub fn judge_label(self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp98 => "C++",
            Language::Cpp11 => "C++11",
            Language::Java => "Java8",
            Language::Python3 => "Python3",
            Language::Python2 => "Python2.7",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
