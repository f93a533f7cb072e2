//! Gemini 生成接口客户端
//!
//! 职责：
//! - 通过单次 HTTP POST 投递生成请求
//! - 指数退避重试，对调用方隐藏瞬时故障
//! - 返回首个成功响应的原始响应体
//! - 全部尝试失败时上报携带最后一次原因的耗尽错误

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::envelope::GenerationRequest;
use crate::utils::text::truncate_text;

/// 错误信息中响应体预览的最大长度
const BODY_PREVIEW_LIMIT: usize = 200;

/// 请求投递能力的抽象
///
/// 生产实现走 HTTP，测试可以注入脚本化的替身
#[async_trait]
pub trait QuestionTransport: Send + Sync {
    /// 投递一次请求，成功时返回原始响应体
    async fn send(&self, request: &GenerationRequest) -> Result<String, ApiError>;
}

/// 基于 reqwest 的生产传输实现
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    /// 从配置创建传输实现
    ///
    /// 端点与凭证都来自显式配置，不内嵌任何常量
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base_url.trim_end_matches('/'),
            config.model_name
        );
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl QuestionTransport for HttpTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::RequestFailed {
            endpoint: self.endpoint.clone(),
            source: Box::new(e),
        })?;

        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body_preview: preview_body(&body),
            });
        }

        Ok(body)
    }
}

/// 重试策略
///
/// 第 k 次尝试（1-indexed）失败后等待 2^k * base_delay 再发起第 k+1 次，
/// 无抖动，除尝试上限外无等待上限
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 总尝试次数上限
    pub max_attempts: u32,
    /// 退避基准时长
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// 归一化后的尝试次数（至少 1 次）
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// 第 attempt 次尝试失败后的等待时长
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = 1u64 << attempt.min(30);
        let base_ms = self.base_delay.as_millis() as u64;
        Duration::from_millis(base_ms.saturating_mul(exp))
    }
}

/// 带重试的生成客户端
pub struct GenerationClient {
    transport: Box<dyn QuestionTransport>,
    policy: RetryPolicy,
}

impl GenerationClient {
    /// 从配置创建生产客户端
    pub fn new(config: &Config) -> Self {
        Self {
            transport: Box::new(HttpTransport::new(config)),
            policy: RetryPolicy::default(),
        }
    }

    /// 使用自定义传输与策略创建
    pub fn with_transport(transport: Box<dyn QuestionTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// 投递请求并返回首个成功响应的原始响应体
    ///
    /// 首次成功立即返回；全部尝试失败时返回携带最后一次失败原因的耗尽错误。
    /// 调用方在完成或耗尽之前保持挂起，重试之间不会并发发起请求。
    pub async fn generate(&self, request: &GenerationRequest) -> AppResult<String> {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            debug!("📡 发送生成请求 (尝试 {}/{})", attempt, attempts);

            match self.transport.send(request).await {
                Ok(body) => {
                    debug!("✓ 第 {} 次尝试成功, 响应体 {} 字节", attempt, body.len());
                    return Ok(body);
                }
                Err(e) => {
                    warn!("⚠️ 第 {}/{} 次尝试失败: {}", attempt, attempts, e);

                    if attempt >= attempts {
                        error!("❌ 已连续失败 {} 次, 放弃请求", attempts);
                        return Err(AppError::Api(ApiError::Exhausted {
                            attempts,
                            source: Box::new(e),
                        }));
                    }

                    let delay = self.policy.delay_after(attempt);
                    debug!("等待 {} ms 后重试", delay.as_millis());
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// 截断响应体用于错误信息展示
fn preview_body(body: &str) -> String {
    if body.is_empty() {
        return "<空响应体>".to_string();
    }
    truncate_text(body, BODY_PREVIEW_LIMIT)
}
