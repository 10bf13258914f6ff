//! logbridge - log4net 风格的结构化日志
//!
//! ## 模块
//!
//! - **exception**: 异常到 JSON 的序列化、通用对象 JSON 渲染
//! - **log**: 日志记录、渲染器映射、XML 格式化器、输出器、Logger 与 LoggerProvider
//! - **cfg**: 组件注册表与配置文件加载
//!
//! ## 示例
//!
//! ```
//! use logbridge::exception::{serialize_exception, ExceptionRecord};
//!
//! let exception = ExceptionRecord::new("InvalidOperation", "queue is closed")
//!     .with_stack_trace("at Queue.push\nat Worker.run");
//! let json = serialize_exception(Some(&exception)).unwrap();
//! assert!(json.starts_with(r#"{ "Message" : "queue is closed""#));
//! ```

pub mod cfg;
pub mod exception;
pub mod log;

pub use cfg::{create_trait_from_type_options, register_trait, TypeOptions};

pub use exception::{
    render_as_json, render_as_json_with, serialize_exception, Exception, ExceptionRecord,
    ExceptionSerializer,
};

pub use log::{
    LocationXmlLayout, LogAppender, LogFormatter, LogLevel, LogRecord, Logger, LoggerConfig,
    LoggerProvider, LoggerProviderConfig, RendererMap, XmlLayout,
};
