use crate::log::log_record::LogRecord;
use anyhow::Result;

/// 日志格式化器
///
/// 每条事件调用一次 `format`，返回交给 appender 的完整文本。
/// 实现只读取记录与自身配置，可以被多个任务并发调用。
pub trait LogFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<String>;
}
