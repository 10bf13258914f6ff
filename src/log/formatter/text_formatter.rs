use crate::log::formatter::LogFormatter;
use crate::log::level::LogLevel;
use crate::log::log_record::{LogRecord, MetadataValue};
use crate::log::renderer::RendererMap;
use anyhow::Result;
use chrono::SecondsFormat;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::fmt::Write;

/// TextFormatter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct TextFormatterConfig {
    /// 是否启用颜色输出
    #[default = false]
    pub colored: bool,
}

/// 文本格式化器
///
/// 输出格式：`[时间] [线程] 级别 logger [文件:行号] 消息 | k=v ...`，
/// 有异常时在下一行追加异常文本
pub struct TextFormatter {
    config: TextFormatterConfig,
    renderers: RendererMap,
}

impl TextFormatter {
    pub fn new(config: TextFormatterConfig) -> Self {
        Self {
            config,
            renderers: RendererMap::empty(),
        }
    }

    pub fn with_renderers(mut self, renderers: RendererMap) -> Self {
        self.renderers = renderers;
        self
    }

    fn paint(&self, result: &mut String, code: &str, text: &str) {
        if self.config.colored {
            result.push_str(code);
            result.push_str(text);
            result.push_str("\x1b[0m");
        } else {
            result.push_str(text);
        }
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut result = String::with_capacity(96 + record.message.len());

        result.push('[');
        self.paint(
            &mut result,
            "\x1b[2m",
            &record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
        );
        result.push_str("] [");
        self.paint(&mut result, "\x1b[2m", &record.thread_name);
        result.push_str("] ");

        if self.config.colored {
            write!(result, "{} ", colored_level(record.level))?;
        } else {
            write!(result, "{:<5} ", record.level)?;
        }

        if !record.logger_name.is_empty() {
            result.push_str(&record.logger_name);
            result.push(' ');
        }

        if let Some(location) = &record.location {
            result.push('[');
            self.paint(
                &mut result,
                "\x1b[2m",
                &format!("{}:{}", location.file_name, location.line_number),
            );
            result.push_str("] ");
        }

        self.paint(&mut result, "\x1b[97m", &record.message);

        if !record.properties.is_empty() {
            result.push_str(" |");
            for (key, value) in &record.properties {
                result.push(' ');
                self.paint(&mut result, "\x1b[36m", key);
                result.push('=');
                result.push_str(&self.renderers.find_and_render(value));
            }
        }

        if let Some(exception) = &record.exception {
            result.push('\n');
            let text = self
                .renderers
                .find_and_render(&MetadataValue::Exception(exception.clone()));
            result.push_str(&text);
        }

        Ok(result)
    }
}

/// 带颜色的日志级别字符串
fn colored_level(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Fatal => "\u{1b}[35mFATAL\u{1b}[0m",
        LogLevel::Error => "\u{1b}[31mERROR\u{1b}[0m",
        LogLevel::Warn => "\u{1b}[33mWARN \u{1b}[0m",
        LogLevel::Info => "\u{1b}[32mINFO \u{1b}[0m",
        LogLevel::Debug => "\u{1b}[36mDEBUG\u{1b}[0m",
        LogLevel::Trace => "\u{1b}[37;2mTRACE\u{1b}[0m",
    }
}

crate::impl_from!(TextFormatterConfig => TextFormatter);
crate::impl_box_from!(TextFormatter => dyn LogFormatter);
