use crate::cfg::{create_trait_from_type_options, TypeOptions};
use crate::exception::Exception;
use crate::log::{
    appender::LogAppender,
    formatter::LogFormatter,
    level::LogLevel,
    log_record::{LogRecord, MetadataValue},
};
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::sync::{Arc, Once};
use tokio::sync::RwLock;

/// 消息为空时的替代文本
pub const NO_MESSAGE: &str = "No message.";

/// 异常详情格式化函数：`(消息, 异常) -> 新消息`
pub type ExceptionFormatter = Arc<dyn Fn(&str, &dyn Exception) -> String + Send + Sync>;

/// Logger 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// 日志级别
    #[default = "info"]
    pub level: String,

    /// Formatter 配置
    #[default(TypeOptions::named("LocationXmlLayout"))]
    pub formatter: TypeOptions,

    /// Appender 配置
    #[default(TypeOptions::named("ConsoleAppender"))]
    pub appender: TypeOptions,
}

/// 注册所有日志组件（只执行一次）
static REGISTER_ONCE: Once = Once::new();

pub(crate) fn register_components() {
    REGISTER_ONCE.call_once(|| {
        if let Err(err) = crate::log::register_formatters() {
            tracing::warn!(error = %err, "failed to register formatters");
        }
        if let Err(err) = crate::log::register_appenders() {
            tracing::warn!(error = %err, "failed to register appenders");
        }
    });
}

/// 默认的异常详情格式化：`<消息> - <类型>: <异常消息>`，随后逐行追加堆栈
pub fn default_exception_formatter(message: &str, exception: &dyn Exception) -> String {
    let mut text = format!(
        "{} - {}: {}",
        message,
        exception.full_type_name(),
        exception.message()
    );
    if let Some(stack_trace) = exception.stack_trace() {
        for line in stack_trace.lines().filter(|line| !line.trim().is_empty()) {
            text.push('\n');
            text.push_str(line);
        }
    }
    text
}

/// 命名日志器
///
/// 负责级别过滤、补全记录上下文（logger 名、domain、用户名），
/// 再交给 formatter 和 appender 输出
pub struct Logger {
    name: String,
    level: Arc<RwLock<LogLevel>>,
    formatter: Arc<dyn LogFormatter>,
    appender: Arc<dyn LogAppender>,
    domain: Option<String>,
    user_name: Option<String>,
    exception_formatter: Option<ExceptionFormatter>,
}

impl Logger {
    /// 从配置创建 Logger
    pub fn new(name: impl Into<String>, config: LoggerConfig) -> Result<Self> {
        register_components();

        let level = LogLevel::parse_or_default(&config.level);

        let formatter_box: Box<dyn LogFormatter> = create_trait_from_type_options(&config.formatter)?;
        let appender_box: Box<dyn LogAppender> = create_trait_from_type_options(&config.appender)?;

        Ok(Self::with_components(
            name,
            level,
            Arc::from(formatter_box),
            Arc::from(appender_box),
        ))
    }

    /// 直接使用已构造好的组件创建 Logger
    pub fn with_components(
        name: impl Into<String>,
        level: LogLevel,
        formatter: Arc<dyn LogFormatter>,
        appender: Arc<dyn LogAppender>,
    ) -> Self {
        Self {
            name: name.into(),
            level: Arc::new(RwLock::new(level)),
            formatter,
            appender,
            domain: None,
            user_name: None,
            exception_formatter: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// 设置异常详情格式化函数，仅在记录带异常时生效
    pub fn with_exception_formatter(mut self, formatter: ExceptionFormatter) -> Self {
        self.exception_formatter = Some(formatter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置日志级别
    pub async fn set_level(&self, level: LogLevel) {
        *self.level.write().await = level;
    }

    /// 获取当前日志级别
    pub async fn get_level(&self) -> LogLevel {
        *self.level.read().await
    }

    pub async fn is_enabled(&self, level: LogLevel) -> bool {
        level >= *self.level.read().await
    }

    /// 记录日志
    pub async fn log(&self, mut record: LogRecord) -> Result<()> {
        if !self.is_enabled(record.level).await {
            return Ok(());
        }

        if record.logger_name.is_empty() {
            record.logger_name = self.name.clone();
        }
        if record.domain.is_none() {
            record.domain = self.domain.clone();
        }
        if record.user_name.is_none() {
            record.user_name = self.user_name.clone();
        }

        if let (Some(exception), Some(formatter)) = (&record.exception, &self.exception_formatter) {
            record.message = formatter(&record.message, &**exception);
        }
        if record.message.is_empty() {
            record.message = NO_MESSAGE.to_string();
        }

        let formatted = self.formatter.format(&record)?;
        self.appender.append(&formatted).await?;

        Ok(())
    }

    /// 记录一条可能带异常的日志
    pub async fn log_event(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        exception: Option<Arc<dyn Exception>>,
    ) -> Result<()> {
        let mut record = LogRecord::new(level, message);
        record.exception = exception;
        self.log(record).await
    }

    /// 记录带 metadata 的日志
    ///
    /// # 示例
    ///
    /// ```ignore
    /// logger.logm(
    ///     LogLevel::Info,
    ///     "user logged in",
    ///     vec![("user_id", 12345.into()), ("username", "alice".into())],
    /// ).await?;
    /// ```
    pub async fn logm(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: impl IntoIterator<Item = (impl Into<String>, MetadataValue)>,
    ) -> Result<()> {
        let mut record = LogRecord::new(level, message);
        for (key, value) in metadata {
            record = record.with_property(key, value);
        }
        self.log(record).await
    }

    pub async fn trace(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Trace, message)).await
    }

    pub async fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Debug, message)).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Info, message)).await
    }

    pub async fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Warn, message)).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Error, message)).await
    }

    pub async fn fatal(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Fatal, message)).await
    }

    /// 刷新 appender
    pub async fn flush(&self) -> Result<()> {
        self.appender.flush().await
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("user_name", &self.user_name)
            .field("exception_formatter", &self.exception_formatter.is_some())
            .finish_non_exhaustive()
    }
}
