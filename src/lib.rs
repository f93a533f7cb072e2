//! # NEET Quiz Gen
//!
//! 一个基于 Gemini 的 NEET 风格出题与答题应用
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 模型层（Models）
//! - `models/` - 纯数据结构，不含业务逻辑
//! - `Question` / `AnswerLabel` - 题目与选项标签
//! - `GenerationRequest` / `GenerateContentResponse` - 请求与响应信封
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只管一件事
//! - `FileEncoder` - 文件读取与 base64 编码能力
//! - `PromptBuilder` - 提示词与请求组装能力
//! - `response_parser` - 响应校验与题目提取能力
//! - `Exporter` - 纯文本 / CSV 导出能力
//!
//! ### ③ 客户端层（Clients）
//! - `clients/` - 请求投递与重试，对上层隐藏瞬时故障
//! - `QuestionTransport` - 传输抽象，测试可注入替身
//! - `GenerationClient` - 指数退避重试客户端
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义一次完整运行的流转
//! - `GenerationFlow` - 流程编排（构建 → 投递 → 解析）
//! - `QuizSession` - 答题会话状态机（代际编号丢弃过期结果）
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{GenerationClient, HttpTransport, QuestionTransport, RetryPolicy};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::answer_label::AnswerLabel;
pub use models::question::{AnswerMap, Question, ScoreResult};
pub use workflow::{GenerationFlow, QuizSession, SessionState};
