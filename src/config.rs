use crate::error::{AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// Gemini API 基础地址
    pub api_base_url: String,
    /// Gemini API 密钥（必填，不提供默认值）
    pub api_key: String,
    /// 使用的模型名称
    pub model_name: String,
    /// 期望生成的题目数量（缺省时由构建器取默认值）
    pub question_count: Option<i64>,
    /// 导出文件存放目录
    pub export_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model_name: "gemini-2.0-flash".to_string(),
            question_count: None,
            export_dir: ".".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(default.api_base_url),
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.api_key),
            model_name: std::env::var("GEMINI_MODEL_NAME").unwrap_or(default.model_name),
            question_count: std::env::var("QUESTION_COUNT").ok().and_then(|v| v.parse().ok()).or(default.question_count),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 校验必填的 API 密钥已提供
    pub fn require_api_key(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "GEMINI_API_KEY".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
