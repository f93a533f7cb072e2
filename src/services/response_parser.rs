//! 响应校验与解析 - 业务能力层
//!
//! 只负责"把服务端响应体变成题目列表"能力，不关心流程
//!
//! 职责：
//! - 从信封中提取 candidates[0].content.parts[0] 的文本片段
//! - 容忍片段外层的 Markdown 代码围栏
//! - 把片段解码为结构化 payload 并逐题校验
//! - 任何一道题目非法则整批失败，不做部分恢复

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult, ParseError};
use crate::models::answer_label::AnswerLabel;
use crate::models::envelope::{GenerateContentResponse, Part};
use crate::models::question::Question;
use crate::utils::text::truncate_text;

/// 错误信息中原始内容预览的最大长度
const PREVIEW_LIMIT: usize = 200;

/// 结构化 payload 的原始形态
#[derive(Debug, Deserialize)]
struct QuestionsPayload {
    questions: Vec<RawQuestion>,
}

/// 单道题目的原始形态（契约字段为 camelCase）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    question_text: String,
    options: Vec<String>,
    correct_answer: String,
    solution: String,
}

/// 解析服务端响应体为题目列表
///
/// # 参数
/// - `body`: 原始响应体
///
/// # 返回
/// 返回校验完成的题目列表；信封、片段或任一题目非法时返回解析错误
pub fn parse_response(body: &str) -> AppResult<Vec<Question>> {
    let envelope: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AppError::json_decode_failed(truncate_text(body, PREVIEW_LIMIT), e))?;

    let fragment = extract_fragment(&envelope)?;
    let cleaned = strip_code_fence(fragment);

    let payload: QuestionsPayload = serde_json::from_str(cleaned)
        .map_err(|e| AppError::json_decode_failed(truncate_text(cleaned, PREVIEW_LIMIT), e))?;

    if payload.questions.is_empty() {
        return Err(ParseError::EmptyQuestionSet.into());
    }

    let mut questions = Vec::with_capacity(payload.questions.len());
    for (index, raw) in payload.questions.into_iter().enumerate() {
        questions.push(validate_question(index, raw)?);
    }

    debug!("解析出 {} 道题目", questions.len());

    Ok(questions)
}

/// 提取 candidates[0].content.parts[0] 的文本片段
///
/// schema 约束只是建议性的，每一层都可能缺失
fn extract_fragment(envelope: &GenerateContentResponse) -> AppResult<&str> {
    let candidate = envelope.candidates.first().ok_or_else(|| ParseError::MissingFragment {
        detail: "candidates 为空".to_string(),
    })?;

    let content = candidate.content.as_ref().ok_or_else(|| ParseError::MissingFragment {
        detail: "候选缺少 content 字段".to_string(),
    })?;

    let part = content.parts.first().ok_or_else(|| ParseError::MissingFragment {
        detail: "parts 为空".to_string(),
    })?;

    match part {
        Part::Text { text } => Ok(text.as_str()),
        Part::InlineData { .. } => Err(ParseError::MissingFragment {
            detail: "首个 part 不是文本".to_string(),
        }
        .into()),
    }
}

/// 去掉包裹片段的 Markdown 代码围栏（若存在）
fn strip_code_fence(fragment: &str) -> &str {
    if let Ok(re) = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$") {
        if let Some(captures) = re.captures(fragment) {
            if let Some(inner) = captures.get(1) {
                return inner.as_str();
            }
        }
    }
    fragment.trim()
}

/// 校验并规范化单道题目
fn validate_question(index: usize, raw: RawQuestion) -> AppResult<Question> {
    if raw.question_text.trim().is_empty() {
        return Err(AppError::invalid_question(index, "题干为空"));
    }
    if raw.options.len() != 4 {
        return Err(AppError::invalid_question(
            index,
            format!("选项数量为 {}, 应为 4", raw.options.len()),
        ));
    }

    let correct_answer = canonicalize_answer(&raw.correct_answer, &raw.options).ok_or_else(|| {
        AppError::invalid_question(
            index,
            format!("无法识别的正确答案: {}", truncate_text(&raw.correct_answer, 40)),
        )
    })?;

    Ok(Question {
        question_text: raw.question_text,
        options: raw.options,
        correct_answer,
        solution: raw.solution,
    })
}

/// 将正确答案规范化为标签
///
/// 优先识别字母标签（宽容大小写与空白），否则与选项原文精确匹配
fn canonicalize_answer(raw: &str, options: &[String]) -> Option<AnswerLabel> {
    if let Some(label) = AnswerLabel::from_letter(raw) {
        return Some(label);
    }
    options
        .iter()
        .position(|option| option == raw)
        .and_then(AnswerLabel::from_index)
}
