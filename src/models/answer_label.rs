/// 选项标签枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
}

impl AnswerLabel {
    /// 获取字母表示
    pub fn letter(self) -> &'static str {
        match self {
            AnswerLabel::A => "A",
            AnswerLabel::B => "B",
            AnswerLabel::C => "C",
            AnswerLabel::D => "D",
        }
    }

    /// 获取选项位置（0-based）
    pub fn index(self) -> usize {
        match self {
            AnswerLabel::A => 0,
            AnswerLabel::B => 1,
            AnswerLabel::C => 2,
            AnswerLabel::D => 3,
        }
    }

    /// 从选项位置解析标签
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AnswerLabel::A),
            1 => Some(AnswerLabel::B),
            2 => Some(AnswerLabel::C),
            3 => Some(AnswerLabel::D),
            _ => None,
        }
    }

    /// 尝试从字符串解析标签（忽略大小写与首尾空白）
    pub fn from_letter(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(AnswerLabel::A),
            "B" => Some(AnswerLabel::B),
            "C" => Some(AnswerLabel::C),
            "D" => Some(AnswerLabel::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}
