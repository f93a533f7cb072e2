//! 文件编码服务 - 业务能力层
//!
//! 只负责"读取文件并编码为内联附件"能力，不关心流程
//!
//! 职责：
//! - 异步读取磁盘文件，读取失败显式上报
//! - 按扩展名推断媒体类型
//! - 将原始字节编码为 base64 附件
//! - 批量加载时输出顺序与输入顺序一致

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::try_join_all;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::attachment::{EncodedAttachment, UploadedFile};

/// 扩展名到 MIME 类型的静态映射
static MIME_TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "pdf" => "application/pdf",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "txt" => "text/plain",
    "md" => "text/markdown",
    "html" => "text/html",
    "csv" => "text/csv",
};

/// 未知扩展名的兜底媒体类型
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// 文件编码服务
pub struct FileEncoder;

impl FileEncoder {
    /// 创建新的编码服务
    pub fn new() -> Self {
        Self
    }

    /// 从磁盘加载单个文件
    ///
    /// # 参数
    /// - `path`: 文件路径
    ///
    /// # 返回
    /// 返回加载完成的文件，读取失败时返回编码错误
    pub async fn load(&self, path: &Path) -> AppResult<UploadedFile> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let media_type = infer_media_type(path).to_string();

        debug!("已加载文件: {} ({}, {} 字节)", name, media_type, bytes.len());

        Ok(UploadedFile::new(name, media_type, bytes))
    }

    /// 并发加载多个文件，输出顺序与输入一致
    pub async fn load_all(&self, paths: &[PathBuf]) -> AppResult<Vec<UploadedFile>> {
        try_join_all(paths.iter().map(|path| self.load(path))).await
    }

    /// 将原始文件编码为传输安全的附件
    pub fn encode(&self, file: &UploadedFile) -> EncodedAttachment {
        EncodedAttachment {
            media_type: file.media_type.clone(),
            data: STANDARD.encode(&file.bytes),
        }
    }
}

impl Default for FileEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// 按扩展名推断媒体类型
fn infer_media_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_encode_known_bytes() {
        let encoder = FileEncoder::new();
        let file = UploadedFile::new("a.txt", "text/plain", b"hello".to_vec());

        let attachment = encoder.encode(&file);

        assert_eq!(attachment.media_type, "text/plain");
        assert_eq!(attachment.data, "aGVsbG8=");
    }

    #[test]
    fn test_infer_media_type() {
        assert_eq!(infer_media_type(Path::new("notes.pdf")), "application/pdf");
        assert_eq!(infer_media_type(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(infer_media_type(Path::new("data.bin")), "application/octet-stream");
        assert_eq!(infer_media_type(Path::new("no_extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let encoder = FileEncoder::new();

        let err = encoder
            .load(Path::new("/nonexistent/quiz_material.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Encoding(crate::error::EncodingError::ReadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_all_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["first.txt", "second.txt", "third.txt"] {
            let path = dir.path().join(name);
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(name.as_bytes()).unwrap();
            paths.push(path);
        }

        let encoder = FileEncoder::new();
        let files = encoder.load_all(&paths).await.unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.txt", "third.txt"]);
        assert_eq!(files[1].bytes, b"second.txt");
    }
}
