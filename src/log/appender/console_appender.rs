use crate::log::appender::LogAppender;
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::io::Write;

/// 终端输出目标
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, SmartDefault)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// ConsoleAppender 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ConsoleAppenderConfig {
    pub target: ConsoleTarget,
}

/// 终端输出器，每条事件一行并立即 flush
pub struct ConsoleAppender {
    target: ConsoleTarget,
}

impl ConsoleAppender {
    pub fn new(config: ConsoleAppenderConfig) -> Self {
        Self {
            target: config.target,
        }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

fn write_line(mut out: impl Write, line: &str) -> std::io::Result<()> {
    writeln!(out, "{}", line)?;
    out.flush()
}

#[async_trait::async_trait]
impl LogAppender for ConsoleAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => write_line(std::io::stdout().lock(), formatted_message)?,
            ConsoleTarget::Stderr => write_line(std::io::stderr().lock(), formatted_message)?,
        }
        Ok(())
    }
}

crate::impl_from!(ConsoleAppenderConfig => ConsoleAppender);
crate::impl_box_from!(ConsoleAppender => dyn LogAppender);
