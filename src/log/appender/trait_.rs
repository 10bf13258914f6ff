use anyhow::Result;

/// 日志输出器
///
/// 接收格式化器输出的一条完整事件文本（XML 事件、文本行或 JSON），
/// 由实现决定写往何处以及是否追加换行。
#[async_trait::async_trait]
pub trait LogAppender: Send + Sync {
    /// 写入一条已格式化的事件
    async fn append(&self, formatted_message: &str) -> Result<()>;

    /// 把缓冲中的内容落盘；无缓冲的实现保持默认
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
