//! 提示词构建服务 - 业务能力层
//!
//! 只负责"把文件与数量组装成生成请求"能力，不关心流程
//!
//! 职责：
//! - 归一化期望题目数量（缺失、零、负数一律取默认值）
//! - 组装固定指令模板、附件序列与输出 schema
//! - 在任何编码与网络活动之前校验文件列表非空

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{AppResult, BusinessError};
use crate::models::attachment::UploadedFile;
use crate::models::envelope::{Content, GenerationConfig, GenerationRequest, InlineData, Part};
use crate::services::file_encoder::FileEncoder;

/// 未指定数量时默认生成的题目数
pub const DEFAULT_QUESTION_COUNT: i64 = 10;

/// 提示词构建服务
pub struct PromptBuilder {
    encoder: FileEncoder,
}

impl PromptBuilder {
    /// 创建新的构建服务
    pub fn new() -> Self {
        Self {
            encoder: FileEncoder::new(),
        }
    }

    /// 归一化期望数量：缺失、零或负数一律取默认值
    pub fn effective_count(desired_count: Option<i64>) -> i64 {
        match desired_count {
            Some(n) if n >= 1 => n,
            _ => DEFAULT_QUESTION_COUNT,
        }
    }

    /// 构建完整的生成请求
    ///
    /// # 参数
    /// - `files`: 已加载的文件列表，附件顺序与其一致
    /// - `desired_count`: 期望题目数量
    ///
    /// # 返回
    /// 返回可直接序列化投递的请求体；文件列表为空时返回业务错误
    pub fn build(
        &self,
        files: &[UploadedFile],
        desired_count: Option<i64>,
    ) -> AppResult<GenerationRequest> {
        if files.is_empty() {
            return Err(BusinessError::EmptyFileList.into());
        }

        let count = Self::effective_count(desired_count);

        let mut parts = Vec::with_capacity(files.len() + 1);
        parts.push(Part::Text {
            text: instruction_text(count),
        });
        for file in files {
            let attachment = self.encoder.encode(file);
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: attachment.media_type,
                    data: attachment.data,
                },
            });
        }

        debug!("构建生成请求: {} 个附件, 期望 {} 道题目", files.len(), count);

        Ok(GenerationRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        })
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 固定指令模板，仅由期望数量参数化
fn instruction_text(count: i64) -> String {
    format!(
        "You are an expert NEET exam tutor. Study the attached material carefully and \
         generate exactly {count} multiple-choice questions in NEET style based on it. \
         Each question must have exactly 4 options and exactly one correct answer. \
         Respond with JSON only, matching the declared schema: an object with a \
         \"questions\" array where each element has \"questionText\", \"options\" \
         (an array of 4 strings), \"correctAnswer\" (the single letter A, B, C or D), \
         and \"solution\" (a short explanation of the correct answer)."
    )
}

/// 声明式输出 schema：包含 questions 数组的对象
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "questionText": { "type": "STRING" },
                        "options": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        },
                        "correctAnswer": { "type": "STRING" },
                        "solution": { "type": "STRING" }
                    },
                    "required": ["questionText", "options", "correctAnswer", "solution"]
                }
            }
        },
        "required": ["questions"]
    })
}
