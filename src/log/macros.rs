//! 日志宏
//!
//! 自动捕获调用位置（模块、函数、文件、行号），写入记录的 location 块，
//! 配合 `LocationXmlLayout` 输出 `locationInfo`。
//!
//! ```ignore
//! use logbridge::{error, info};
//!
//! info!(logger, "application started")?;
//! info!(logger, "user logged in", "user_id" => 12345, "username" => "alice")?;
//! error!(logger, "charge failed", exception = Arc::new(err), "order" => 7)?;
//! ```

/// 当前函数名，去掉模块路径与 async 块产生的 `{{closure}}`
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        name.rsplit("::").next().unwrap_or(name)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_record {
    ($level:expr, $msg:expr) => {
        $crate::log::LogRecord::new($level, $msg).with_location($crate::log::LocationInfo::new(
            module_path!(),
            $crate::__function_name!(),
            file!(),
            line!(),
        ))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, $logger:expr, $msg:expr) => {
        $logger.log($crate::__log_record!($level, $msg)).await
    };
    ($level:expr, $logger:expr, $msg:expr, exception = $exception:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger
            .log(
                $crate::__log_record!($level, $msg)
                    .with_exception_arc($exception)
                    $(.with_property($key, $value))*
            )
            .await
    };
    ($level:expr, $logger:expr, $msg:expr, $($key:expr => $value:expr),* $(,)?) => {
        $logger
            .log($crate::__log_record!($level, $msg)$(.with_property($key, $value))*)
            .await
    };
}

/// 记录 TRACE 级别日志
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($crate::log::LogLevel::Trace, $logger, $($arg)+)
    };
}

/// 记录 DEBUG 级别日志
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($crate::log::LogLevel::Debug, $logger, $($arg)+)
    };
}

/// 记录 INFO 级别日志
///
/// ```ignore
/// info!(logger, "user logged in");
/// info!(logger, "user action", "user_id" => 12345, "action" => "login");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($crate::log::LogLevel::Info, $logger, $($arg)+)
    };
}

/// 记录 WARN 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($crate::log::LogLevel::Warn, $logger, $($arg)+)
    };
}

/// 记录 ERROR 级别日志
///
/// ```ignore
/// error!(logger, "query failed", exception = Arc::new(err), "retry_count" => 3);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($crate::log::LogLevel::Error, $logger, $($arg)+)
    };
}

/// 记录 FATAL 级别日志
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($crate::log::LogLevel::Fatal, $logger, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::exception::{Exception, ExceptionRecord};
    use crate::log::appender::LogAppender;
    use crate::log::formatter::{LocationXmlLayout, XmlLayoutConfig};
    use crate::log::{LogLevel, Logger};
    use anyhow::Result;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryAppender {
        lines: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl LogAppender for MemoryAppender {
        async fn append(&self, formatted_message: &str) -> Result<()> {
            self.lines.lock().await.push(formatted_message.to_string());
            Ok(())
        }
    }

    fn logger(appender: Arc<MemoryAppender>) -> Logger {
        Logger::with_components(
            "macros",
            LogLevel::Trace,
            Arc::new(LocationXmlLayout::new(XmlLayoutConfig {
                location_info: true,
                ..Default::default()
            })),
            appender,
        )
    }

    #[test]
    fn test_function_name() {
        assert_eq!(crate::__function_name!(), "test_function_name");
    }

    #[tokio::test]
    async fn test_function_name_in_async_fn() {
        assert_eq!(crate::__function_name!(), "test_function_name_in_async_fn");
    }

    #[tokio::test]
    async fn test_macro_captures_location() -> Result<()> {
        let appender = Arc::new(MemoryAppender::default());
        let logger = logger(appender.clone());

        crate::info!(logger, "started")?;

        let lines = appender.lines.lock().await;
        assert!(lines[0].starts_with(r#"<event logger="macros" "#));
        assert!(lines[0].contains(r#"level="INFO""#));
        assert!(lines[0].contains(&format!(
            r#"<locationInfo class="{}" method="test_macro_captures_location" file="{}" line="#,
            module_path!(),
            file!()
        )));

        Ok(())
    }

    #[tokio::test]
    async fn test_macro_with_properties_and_exception() -> Result<()> {
        let appender = Arc::new(MemoryAppender::default());
        let logger = logger(appender.clone());

        crate::warn!(logger, "slow query", "duration_ms" => 1500, "table" => "users")?;
        let exception: Arc<dyn Exception> = Arc::new(ExceptionRecord::new("Timeout", "gateway"));
        crate::error!(logger, "charge failed", exception = exception, "order" => 7)?;
        crate::fatal!(logger, "shutting down", exception = Arc::new(ExceptionRecord::new("Panic", "x")))?;

        let lines = appender.lines.lock().await;
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(
            r#"<properties><data name="duration_ms" value="1500"/><data name="table" value="users"/></properties>"#
        ));
        assert!(lines[1].contains(r#"<data name="order" value="7"/>"#));
        assert!(lines[1].contains("<exception>"));
        assert!(lines[2].contains(r#"level="FATAL""#));

        Ok(())
    }

    #[tokio::test]
    async fn test_macro_respects_level() -> Result<()> {
        let appender = Arc::new(MemoryAppender::default());
        let logger = logger(appender.clone());
        logger.set_level(LogLevel::Info).await;

        crate::trace!(logger, "hidden")?;
        crate::debug!(logger, "hidden", "k" => 1)?;
        crate::info!(logger, "shown")?;

        assert_eq!(appender.lines.lock().await.len(), 1);

        Ok(())
    }
}
