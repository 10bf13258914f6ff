use thiserror::Error;

/// 异常序列化相关错误
#[derive(Error, Debug)]
pub enum ExceptionError {
    /// 顶层必需参数缺失
    #[error("invalid argument: `{name}` must not be null")]
    InvalidArgument { name: &'static str },

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// 读取扩展属性时发生的错误
///
/// 两种错误在序列化时都会被静默跳过，只是记录的诊断日志级别不同。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property is not implemented")]
    NotImplemented,

    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, ExceptionError>;
