//! 导出服务 - 业务能力层
//!
//! 只负责"把题目集渲染为文本并落盘"能力，不关心流程
//!
//! 职责：
//! - 纯函数渲染纯文本与 CSV 两种格式
//! - 以固定文件名写入配置的导出目录

use std::path::PathBuf;

use tracing::info;

use crate::error::{AppError, AppResult, FileError};
use crate::models::answer_label::AnswerLabel;
use crate::models::question::Question;

/// 纯文本导出文件名
pub const PLAIN_TEXT_FILE_NAME: &str = "neet_questions_and_solutions.txt";
/// CSV 导出文件名
pub const CSV_FILE_NAME: &str = "neet_questions_and_solutions.csv";

/// 导出服务
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    /// 使用当前目录创建
    pub fn new() -> Self {
        Self {
            export_dir: PathBuf::from("."),
        }
    }

    /// 使用自定义导出目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: dir.into(),
        }
    }

    /// 渲染纯文本格式
    ///
    /// 每道题目：1-based 序号与题干、字母前缀的选项、正确答案、解析，
    /// 题目之间以空行分隔
    pub fn render_plain_text(&self, questions: &[Question]) -> String {
        let mut blocks = Vec::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            let mut lines = Vec::with_capacity(7);
            lines.push(format!("{}. {}", index + 1, question.question_text));
            for (i, option) in question.options.iter().enumerate() {
                if let Some(label) = AnswerLabel::from_index(i) {
                    lines.push(format!("{}. {}", label.letter(), option));
                }
            }
            lines.push(format!("Answer: {}", question.correct_answer.letter()));
            lines.push(format!("Solution: {}", question.solution));
            blocks.push(lines.join("\n"));
        }
        let mut output = blocks.join("\n\n");
        output.push('\n');
        output
    }

    /// 渲染 CSV 格式
    ///
    /// 表头固定，字段整体加引号，字段内引号加倍转义
    pub fn render_csv(&self, questions: &[Question]) -> String {
        let mut lines = Vec::with_capacity(questions.len() + 1);
        lines.push(r#""Question","Correct Answer","Solution""#.to_string());
        for question in questions {
            lines.push(format!(
                r#""{}","{}","{}""#,
                csv_escape(&question.question_text),
                question.correct_answer.letter(),
                csv_escape(&question.solution),
            ));
        }
        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// 渲染并写入两种格式
    ///
    /// # 返回
    /// 返回 (纯文本路径, CSV 路径)
    pub async fn save_all(&self, questions: &[Question]) -> AppResult<(PathBuf, PathBuf)> {
        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| {
                AppError::File(FileError::CreateDirFailed {
                    path: self.export_dir.display().to_string(),
                    source: Box::new(e),
                })
            })?;

        let txt_path = self.export_dir.join(PLAIN_TEXT_FILE_NAME);
        tokio::fs::write(&txt_path, self.render_plain_text(questions))
            .await
            .map_err(|e| AppError::file_write_failed(txt_path.display().to_string(), e))?;

        let csv_path = self.export_dir.join(CSV_FILE_NAME);
        tokio::fs::write(&csv_path, self.render_csv(questions))
            .await
            .map_err(|e| AppError::file_write_failed(csv_path.display().to_string(), e))?;

        info!(
            "📤 已导出 {} 道题目到 {}",
            questions.len(),
            self.export_dir.display()
        );

        Ok((txt_path, csv_path))
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 字段内引号加倍
fn csv_escape(field: &str) -> String {
    field.replace('"', "\"\"")
}
