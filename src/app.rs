//! 应用驱动层
//!
//! 把文件加载、题目生成、终端答题与结果导出串成一次完整运行

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::answer_label::AnswerLabel;
use crate::models::question::{Question, ScoreResult};
use crate::services::exporter::Exporter;
use crate::services::file_encoder::FileEncoder;
use crate::services::prompt_builder::PromptBuilder;
use crate::workflow::generation_flow::GenerationFlow;
use crate::workflow::quiz_session::{QuizSession, SessionState};

/// 应用主结构
pub struct App {
    config: Config,
    encoder: FileEncoder,
    flow: GenerationFlow,
    session: QuizSession,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.require_api_key()?;

        log_startup(&config);

        let flow = GenerationFlow::new(&config);
        Ok(Self {
            config,
            encoder: FileEncoder::new(),
            flow,
            session: QuizSession::new(),
        })
    }

    /// 运行应用主逻辑：加载资料、生成题目、答题、评分、导出
    pub async fn run(&mut self, paths: Vec<PathBuf>) -> Result<()> {
        if paths.is_empty() {
            let _ = self.session.begin_submission(0);
            if let SessionState::Error(message) = self.session.state() {
                bail!("{}", message);
            }
            bail!("未提供任何资料文件");
        }

        info!("📁 正在加载 {} 个资料文件...", paths.len());
        let files = self.encoder.load_all(&paths).await?;

        let generation = self.session.begin_submission(files.len())?;

        let outcome = self.flow.run(&files, self.config.question_count).await;
        let failure = outcome.as_ref().err().map(|e| e.to_string());
        self.session.complete_generation(generation, outcome);

        if let Some(message) = failure {
            bail!("题目生成失败: {}", message);
        }

        let questions = match self.session.state() {
            SessionState::Answering { questions, .. } => questions.clone(),
            other => bail!("会话状态异常: {:?}", other),
        };

        self.collect_answers(&questions)?;

        let score = match self.session.submit_quiz() {
            Some(score) => score,
            None => bail!("交卷失败: 会话已不在答题状态"),
        };

        let exporter = Exporter::with_dir(&self.config.export_dir);
        let (txt_path, csv_path) = exporter.save_all(&questions).await?;

        print_final_stats(files.len(), &questions, score, &txt_path, &csv_path);

        Ok(())
    }

    /// 终端逐题收集作答
    ///
    /// 空行跳过当前题目，无法识别的输入按未作答处理，输入结束提前交卷
    fn collect_answers(&mut self, questions: &[Question]) -> Result<()> {
        println!("\n请逐题作答，输入选项字母 (A-D)，直接回车跳过:");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        for (index, question) in questions.iter().enumerate() {
            print_question(index, question);

            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    info!("输入结束, 提前交卷");
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match AnswerLabel::from_letter(trimmed) {
                Some(label) => self.session.select_answer(index, label.letter()),
                None => warn!("⚠️ 无法识别的选项 '{}', 该题按未作答处理", trimmed),
            }
        }

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 NEET 出题器启动");
    info!("🤖 模型: {}", config.model_name);
    info!(
        "📋 目标题目数: {}",
        PromptBuilder::effective_count(config.question_count)
    );
    info!("{}", "=".repeat(60));
}

fn print_question(index: usize, question: &Question) {
    println!("\n{}. {}", index + 1, question.question_text);
    for (i, option) in question.options.iter().enumerate() {
        if let Some(label) = AnswerLabel::from_index(i) {
            println!("  {}. {}", label.letter(), option);
        }
    }
    print!("作答: ");
    let _ = std::io::stdout().flush();
}

fn print_final_stats(
    file_count: usize,
    questions: &[Question],
    score: ScoreResult,
    txt_path: &Path,
    csv_path: &Path,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本轮答题统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📁 资料文件: {} 个", file_count);
    info!("✅ 题目数量: {} 道", questions.len());
    info!("📈 得分: {}", score);
    info!("{}", "=".repeat(60));
    info!("\n已导出: {}", txt_path.display());
    info!("已导出: {}", csv_path.display());
}
