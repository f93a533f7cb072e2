//! 上传文件与内联附件模型

/// 用户上传的原始文件
///
/// 加载完成后不可变，由会话持有直到提交
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 文件名（仅用于日志显示）
    pub name: String,
    /// 声明的媒体类型
    pub media_type: String,
    /// 原始字节
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// 创建新的上传文件
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// 传输安全的内联附件
///
/// 与 UploadedFile 一一对应，生成后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAttachment {
    /// 媒体类型
    pub media_type: String,
    /// base64 编码后的内容
    pub data: String,
}
