//! 日志模块
//!
//! 以 log4net 的 XML 事件格式输出日志，异常通过渲染器映射序列化为 JSON 文本。
//!
//! # 特性
//!
//! - 日志级别：Trace, Debug, Info, Warn, Error, Fatal
//! - 格式化器：XmlLayout、LocationXmlLayout、TextFormatter、JsonFormatter
//! - 输出目标：ConsoleAppender、FileAppender
//! - 按分类缓存 Logger 的 LoggerProvider，配置可从文件加载
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use logbridge::log::*;
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config: LoggerProviderConfig = json5::from_str(r#"
//!         {
//!             root: {
//!                 level: "info",
//!                 formatter: { type: "LocationXmlLayout", options: { location_info: true } },
//!                 appender: { type: "FileAppender", options: { file_path: "logs/app.xml" } }
//!             },
//!             domain: "shop"
//!         }
//!     "#)?;
//!
//!     let provider = LoggerProvider::new(config);
//!     let logger = provider.create_logger("shop.orders")?;
//!
//!     logbridge::info!(logger, "order placed", "order_id" => 42)?;
//!
//!     Ok(())
//! }
//! ```

pub mod appender;
pub mod formatter;
pub mod level;
pub mod log_record;
pub mod logger;
pub mod macros;
pub mod provider;
pub mod renderer;

pub use appender::{
    create_appender_from_options, register_appenders, ConsoleAppender, ConsoleAppenderConfig,
    ConsoleTarget, FileAppender, FileAppenderConfig, LogAppender,
};
pub use formatter::{
    create_formatter_from_options, register_formatters, JsonFormatter, JsonFormatterConfig,
    LocationXmlLayout, LogFormatter, TextFormatter, TextFormatterConfig, XmlLayout,
    XmlLayoutConfig,
};
pub use level::LogLevel;
pub use log_record::{LocationInfo, LogRecord, MetadataValue};
pub use logger::{default_exception_formatter, ExceptionFormatter, Logger, LoggerConfig, NO_MESSAGE};
pub use provider::{LoggerProvider, LoggerProviderConfig};
pub use renderer::{ExceptionJsonRenderer, ObjectRenderer, RendererMap, ValueKind};
