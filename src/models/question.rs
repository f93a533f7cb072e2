//! 题目与得分模型

use std::collections::HashMap;
use std::fmt;

use crate::models::answer_label::AnswerLabel;

/// 单道多选一题目
///
/// 解析校验完成后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// 题干内容
    pub question_text: String,
    /// 四个选项，顺序与标签 A-D 对应
    pub options: Vec<String>,
    /// 正确答案标签（解析时已规范化为字母）
    pub correct_answer: AnswerLabel,
    /// 解析说明
    pub solution: String,
}

/// 题目索引（0-based）到所选标签的映射
///
/// 仅在答题状态下可变，同一索引后写覆盖先写
pub type AnswerMap = HashMap<usize, String>;

/// 得分结果
///
/// 由题目列表与作答映射确定性导出，计算一次后不可变
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    /// 答对数量
    pub correct_count: usize,
    /// 题目总数
    pub total_questions: usize,
    /// 正确率（百分比）
    pub accuracy_percent: f64,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.2}%)",
            self.correct_count, self.total_questions, self.accuracy_percent
        )
    }
}
