use crate::cfg::{create_trait_from_type_options, register_trait, TypeOptions};
use crate::log::appender::{
    ConsoleAppender, ConsoleAppenderConfig, FileAppender, FileAppenderConfig, LogAppender,
};
use anyhow::Result;

/// 以 `ConsoleAppender` / `FileAppender` 为名注册输出器
pub fn register_appenders() -> Result<()> {
    register_trait::<ConsoleAppender, dyn LogAppender, ConsoleAppenderConfig>("ConsoleAppender")?;
    register_trait::<FileAppender, dyn LogAppender, FileAppenderConfig>("FileAppender")?;
    Ok(())
}

/// 按 `TypeOptions` 构造输出器，类型名未注册或选项不合法时返回错误
pub fn create_appender_from_options(options: &TypeOptions) -> Result<Box<dyn LogAppender>> {
    create_trait_from_type_options(options)
}
