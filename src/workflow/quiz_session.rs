//! 答题会话状态机 - 流程编排层
//!
//! 职责：
//! - 维护一次答题会话的状态流转：空闲、加载中、答题中、已评分、出错
//! - 用代际编号丢弃过期的生成结果，后发起的提交永远胜出
//! - 作答与交卷只在对应状态下生效，非法操作记录告警后忽略
//!
//! 状态机本身不做任何 I/O，生成结果由调用方异步送达

use std::collections::HashMap;
use std::mem;

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, BusinessError};
use crate::models::question::{AnswerMap, Question, ScoreResult};

/// 空提交时展示的错误信息
const EMPTY_SUBMISSION_MESSAGE: &str = "请先选择至少一个文件";
/// 生成失败时展示的错误信息
const GENERATION_FAILED_MESSAGE: &str = "题目生成失败，请重试";

/// 会话状态
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// 尚未发起任何生成
    Idle,
    /// 生成进行中
    Loading,
    /// 出错，携带面向用户的错误信息
    Error(String),
    /// 答题中
    Answering {
        questions: Vec<Question>,
        answers: AnswerMap,
    },
    /// 已交卷评分
    Scored {
        questions: Vec<Question>,
        answers: AnswerMap,
        score: ScoreResult,
    },
}

/// 答题会话
pub struct QuizSession {
    state: SessionState,
    generation: u64,
}

impl QuizSession {
    /// 创建空闲状态的新会话
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
        }
    }

    /// 当前状态
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 当前代际编号
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 发起一轮新的生成
    ///
    /// 文件数为零时同步进入错误状态并返回业务错误，绝不进入加载状态；
    /// 否则分配新的代际编号并进入加载状态。任何状态下都可以重新发起。
    pub fn begin_submission(&mut self, file_count: usize) -> AppResult<u64> {
        if file_count == 0 {
            warn!("⚠️ 空文件列表提交被拒绝");
            self.state = SessionState::Error(EMPTY_SUBMISSION_MESSAGE.to_string());
            return Err(BusinessError::EmptyFileList.into());
        }

        self.generation += 1;
        self.state = SessionState::Loading;
        info!("🚀 开始第 {} 轮生成, {} 个文件", self.generation, file_count);
        Ok(self.generation)
    }

    /// 送达一轮生成的结果
    ///
    /// 仅当代际编号与当前一致且会话仍在加载状态时生效，
    /// 其余一律视为过期结果丢弃，不改变任何状态
    pub fn complete_generation(
        &mut self,
        generation: u64,
        outcome: Result<Vec<Question>, AppError>,
    ) {
        if generation != self.generation {
            warn!(
                "⚠️ 丢弃过期的生成结果: 代际 {} (当前 {})",
                generation, self.generation
            );
            return;
        }
        if self.state != SessionState::Loading {
            warn!("⚠️ 会话已不在加载状态, 丢弃生成结果");
            return;
        }

        match outcome {
            Ok(questions) => {
                info!("✅ 第 {} 轮生成完成, {} 道题目", generation, questions.len());
                self.state = SessionState::Answering {
                    questions,
                    answers: HashMap::new(),
                };
            }
            Err(e) => {
                error!("❌ 第 {} 轮生成失败: {}", generation, e);
                self.state = SessionState::Error(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// 记录一次作答
    ///
    /// 仅在答题状态下生效；同一题目重复作答时后写覆盖先写。
    /// 题目索引越界时忽略并告警。
    pub fn select_answer(&mut self, index: usize, label: impl Into<String>) {
        match &mut self.state {
            SessionState::Answering { questions, answers } => {
                if index >= questions.len() {
                    warn!("⚠️ 作答索引越界被忽略: {} (共 {} 道)", index, questions.len());
                    return;
                }
                answers.insert(index, label.into());
            }
            _ => {
                warn!("⚠️ 非答题状态下的作答被忽略");
            }
        }
    }

    /// 交卷评分
    ///
    /// 仅在答题状态下生效：计算得分并进入已评分状态；
    /// 其余状态下返回 None 且状态不变
    pub fn submit_quiz(&mut self) -> Option<ScoreResult> {
        let state = mem::replace(&mut self.state, SessionState::Idle);
        match state {
            SessionState::Answering { questions, answers } => {
                let score = calculate_results(&questions, &answers);
                info!("📊 交卷: {}", score);
                self.state = SessionState::Scored {
                    questions,
                    answers,
                    score,
                };
                Some(score)
            }
            other => {
                warn!("⚠️ 非答题状态下的交卷被忽略");
                self.state = other;
                None
            }
        }
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

/// 由题目列表与作答映射计算得分
///
/// 仅当所选标签与正确答案字母完全一致才计为答对，
/// 未作答或标签无法识别一律计为答错；空题目列表得分为 0%
pub fn calculate_results(questions: &[Question], answers: &AnswerMap) -> ScoreResult {
    let total_questions = questions.len();
    let correct_count = questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .get(index)
                .map(|selected| selected.as_str() == question.correct_answer.letter())
                .unwrap_or(false)
        })
        .count();

    let accuracy_percent = if total_questions == 0 {
        0.0
    } else {
        correct_count as f64 / total_questions as f64 * 100.0
    };

    ScoreResult {
        correct_count,
        total_questions,
        accuracy_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::answer_label::AnswerLabel;

    fn question(text: &str, correct: AnswerLabel) -> Question {
        Question {
            question_text: text.to_string(),
            options: vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
            correct_answer: correct,
            solution: "fixture".to_string(),
        }
    }

    fn three_questions() -> Vec<Question> {
        vec![
            question("q1", AnswerLabel::A),
            question("q2", AnswerLabel::B),
            question("q3", AnswerLabel::C),
        ]
    }

    fn failure() -> AppError {
        AppError::Api(ApiError::Exhausted {
            attempts: 5,
            source: Box::new(ApiError::BadStatus {
                endpoint: "fixture".to_string(),
                status: 500,
                body_preview: "boom".to_string(),
            }),
        })
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = QuizSession::new();

        assert_eq!(*session.state(), SessionState::Idle);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_begin_submission_enters_loading() {
        let mut session = QuizSession::new();

        let id = session.begin_submission(2).unwrap();

        assert_eq!(id, 1);
        assert_eq!(*session.state(), SessionState::Loading);
    }

    #[test]
    fn test_empty_submission_errors_synchronously() {
        let mut session = QuizSession::new();

        let err = session.begin_submission(0).unwrap_err();

        // 同步进入错误状态，绝不经过加载状态
        assert!(matches!(
            err,
            AppError::Business(BusinessError::EmptyFileList)
        ));
        assert_eq!(
            *session.state(),
            SessionState::Error(EMPTY_SUBMISSION_MESSAGE.to_string())
        );
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_successful_completion_enters_answering() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();

        session.complete_generation(id, Ok(three_questions()));

        match session.state() {
            SessionState::Answering { questions, answers } => {
                assert_eq!(questions.len(), 3);
                assert!(answers.is_empty());
            }
            other => panic!("预期 Answering, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_failed_completion_enters_error() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();

        session.complete_generation(id, Err(failure()));

        assert_eq!(
            *session.state(),
            SessionState::Error(GENERATION_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut session = QuizSession::new();
        let first = session.begin_submission(1).unwrap();
        let second = session.begin_submission(1).unwrap();
        assert_ne!(first, second);

        // 第一轮的结果在第二轮发起后才到达
        session.complete_generation(first, Ok(three_questions()));
        assert_eq!(*session.state(), SessionState::Loading);

        // 第二轮的结果照常生效
        session.complete_generation(second, Ok(three_questions()));
        assert!(matches!(session.state(), SessionState::Answering { .. }));
    }

    #[test]
    fn test_stale_failure_cannot_clobber_answering() {
        let mut session = QuizSession::new();
        let first = session.begin_submission(1).unwrap();
        let second = session.begin_submission(1).unwrap();
        session.complete_generation(second, Ok(three_questions()));

        session.complete_generation(first, Err(failure()));

        assert!(matches!(session.state(), SessionState::Answering { .. }));
    }

    #[test]
    fn test_completion_outside_loading_is_discarded() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();
        session.complete_generation(id, Ok(three_questions()));

        // 同一代际重复送达：会话已在答题状态
        session.complete_generation(id, Err(failure()));

        assert!(matches!(session.state(), SessionState::Answering { .. }));
    }

    #[test]
    fn test_select_answer_records_and_overwrites() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();
        session.complete_generation(id, Ok(three_questions()));

        session.select_answer(0, "A");
        session.select_answer(0, "D");
        session.select_answer(2, "C");

        match session.state() {
            SessionState::Answering { answers, .. } => {
                assert_eq!(answers.len(), 2);
                // 后写覆盖先写
                assert_eq!(answers.get(&0).map(String::as_str), Some("D"));
                assert_eq!(answers.get(&2).map(String::as_str), Some("C"));
            }
            other => panic!("预期 Answering, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_select_answer_rejects_out_of_range_index() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();
        session.complete_generation(id, Ok(three_questions()));

        session.select_answer(3, "A");

        match session.state() {
            SessionState::Answering { answers, .. } => assert!(answers.is_empty()),
            other => panic!("预期 Answering, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_select_answer_ignored_outside_answering() {
        let mut session = QuizSession::new();

        session.select_answer(0, "A");

        assert_eq!(*session.state(), SessionState::Idle);
    }

    #[test]
    fn test_submit_quiz_scores_two_of_three() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();
        session.complete_generation(id, Ok(three_questions()));
        session.select_answer(0, "A");
        session.select_answer(1, "X");
        session.select_answer(2, "C");

        let score = session.submit_quiz().unwrap();

        assert_eq!(score.correct_count, 2);
        assert_eq!(score.total_questions, 3);
        assert!((score.accuracy_percent - 200.0 / 3.0).abs() < 1e-9);
        match session.state() {
            SessionState::Scored { score: kept, .. } => assert_eq!(*kept, score),
            other => panic!("预期 Scored, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_submit_quiz_ignored_outside_answering() {
        let mut session = QuizSession::new();

        assert!(session.submit_quiz().is_none());
        assert_eq!(*session.state(), SessionState::Idle);

        let _ = session.begin_submission(0);
        assert!(session.submit_quiz().is_none());
        assert!(matches!(session.state(), SessionState::Error(_)));
    }

    #[test]
    fn test_restart_from_scored_and_error() {
        let mut session = QuizSession::new();
        let id = session.begin_submission(1).unwrap();
        session.complete_generation(id, Ok(three_questions()));
        session.submit_quiz().unwrap();

        // 评分后可以直接再来一轮
        let next = session.begin_submission(2).unwrap();
        assert_eq!(next, 2);
        assert_eq!(*session.state(), SessionState::Loading);

        session.complete_generation(next, Err(failure()));
        assert!(matches!(session.state(), SessionState::Error(_)));

        // 出错后同样可以重试
        let third = session.begin_submission(1).unwrap();
        assert_eq!(third, 3);
        assert_eq!(*session.state(), SessionState::Loading);
    }

    #[test]
    fn test_calculate_results_empty_question_list() {
        let score = calculate_results(&[], &HashMap::new());

        assert_eq!(score.correct_count, 0);
        assert_eq!(score.total_questions, 0);
        assert_eq!(score.accuracy_percent, 0.0);
    }

    #[test]
    fn test_calculate_results_unanswered_counts_as_wrong() {
        let questions = three_questions();
        let mut answers = HashMap::new();
        answers.insert(1usize, "B".to_string());

        let score = calculate_results(&questions, &answers);

        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total_questions, 3);
    }
}
