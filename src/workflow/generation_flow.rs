//! 题目生成流程 - 流程编排层
//!
//! 职责：
//! - 串联提示词构建、请求投递与响应解析
//! - 已加载文件 → 生成请求 → 原始响应体 → 结构化题目列表
//! - 对数量不符只告警不中断，把判断权留给调用方

use tracing::{debug, info, warn};

use crate::clients::GenerationClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::attachment::UploadedFile;
use crate::models::question::Question;
use crate::services::prompt_builder::PromptBuilder;
use crate::services::response_parser::parse_response;
use crate::utils::text::truncate_text;

/// 题目生成流程
pub struct GenerationFlow {
    builder: PromptBuilder,
    client: GenerationClient,
    verbose_logging: bool,
}

impl GenerationFlow {
    /// 从配置创建生产流程
    pub fn new(config: &Config) -> Self {
        Self {
            builder: PromptBuilder::new(),
            client: GenerationClient::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 使用自定义客户端创建，供测试注入替身传输
    pub fn with_client(client: GenerationClient, verbose_logging: bool) -> Self {
        Self {
            builder: PromptBuilder::new(),
            client,
            verbose_logging,
        }
    }

    /// 执行一次完整的生成：构建请求、投递、解析
    ///
    /// 文件列表为空时在任何网络活动之前返回业务错误
    pub async fn run(
        &self,
        files: &[UploadedFile],
        desired_count: Option<i64>,
    ) -> AppResult<Vec<Question>> {
        let expected = PromptBuilder::effective_count(desired_count);
        let request = self.builder.build(files, desired_count)?;

        info!("🔍 开始生成题目: {} 个附件, 目标 {} 道", files.len(), expected);

        let body = self.client.generate(&request).await?;
        let questions = parse_response(&body)?;

        if questions.len() as i64 != expected {
            warn!(
                "⚠️ 生成数量与预期不符: 预期 {} 道, 实际 {} 道",
                expected,
                questions.len()
            );
        }

        info!("✓ 成功生成 {} 道题目", questions.len());

        if self.verbose_logging {
            for (i, question) in questions.iter().enumerate() {
                debug!("  {}. {}", i + 1, truncate_text(&question.question_text, 60));
            }
        }

        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{QuestionTransport, RetryPolicy};
    use crate::error::{ApiError, AppError, BusinessError, ParseError};
    use async_trait::async_trait;

    /// 始终返回固定响应体的传输替身
    struct CannedTransport {
        body: String,
    }

    #[async_trait]
    impl QuestionTransport for CannedTransport {
        async fn send(
            &self,
            _request: &crate::models::envelope::GenerationRequest,
        ) -> Result<String, ApiError> {
            Ok(self.body.clone())
        }
    }

    fn flow_with_body(body: &str) -> GenerationFlow {
        let client = GenerationClient::with_transport(
            Box::new(CannedTransport {
                body: body.to_string(),
            }),
            RetryPolicy::default(),
        );
        GenerationFlow::with_client(client, false)
    }

    fn file_fixture() -> UploadedFile {
        UploadedFile::new("notes.txt", "text/plain", b"cell biology notes".to_vec())
    }

    fn envelope_with(payload: &serde_json::Value) -> String {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": payload.to_string() }]
                }
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_run_produces_parsed_questions() {
        let payload = serde_json::json!({
            "questions": [{
                "questionText": "Which organelle synthesises proteins?",
                "options": ["Nucleus", "Ribosome", "Vacuole", "Cell wall"],
                "correctAnswer": "B",
                "solution": "Ribosomes translate mRNA into protein."
            }]
        });
        let flow = flow_with_body(&envelope_with(&payload));

        let questions = flow.run(&[file_fixture()], Some(1)).await.unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(
            questions[0].question_text,
            "Which organelle synthesises proteins?"
        );
        assert_eq!(questions[0].correct_answer.letter(), "B");
    }

    #[tokio::test]
    async fn test_run_rejects_empty_file_list_before_transport() {
        // 响应体是故意构造的垃圾：空列表校验必须发生在投递之前
        let flow = flow_with_body("never parsed");

        let err = flow.run(&[], Some(3)).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Business(BusinessError::EmptyFileList)
        ));
    }

    #[tokio::test]
    async fn test_run_surfaces_parse_failures() {
        let flow = flow_with_body("{ not json");

        let err = flow.run(&[file_fixture()], Some(1)).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Parse(ParseError::JsonDecodeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_tolerates_count_mismatch() {
        // 预期 5 道只返回 1 道：记录告警但照常返回
        let payload = serde_json::json!({
            "questions": [{
                "questionText": "Name the powerhouse of the cell.",
                "options": ["Mitochondrion", "Golgi body", "Lysosome", "Centriole"],
                "correctAnswer": "A",
                "solution": "Mitochondria produce ATP."
            }]
        });
        let flow = flow_with_body(&envelope_with(&payload));

        let questions = flow.run(&[file_fixture()], Some(5)).await.unwrap();

        assert_eq!(questions.len(), 1);
    }
}
