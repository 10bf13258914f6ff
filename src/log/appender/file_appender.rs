use crate::log::appender::LogAppender;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

fn default_append_to_file() -> bool {
    true
}

/// FileAppender 配置
#[derive(Debug, Clone, Deserialize)]
pub struct FileAppenderConfig {
    pub file_path: String,

    /// 为 false 时第一次打开文件会清空已有内容
    #[serde(default = "default_append_to_file")]
    pub append_to_file: bool,
}

impl FileAppenderConfig {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            append_to_file: default_append_to_file(),
        }
    }
}

/// 文件输出器
///
/// 每条事件占一行，写完即 flush；父目录不存在时自动创建。
/// 通过注册表（`new`）创建时，文件推迟到第一次写入才打开，
/// 打开失败作为该次 `append` 的错误返回。
pub struct FileAppender {
    config: FileAppenderConfig,
    file: Mutex<Option<File>>,
}

impl FileAppender {
    /// 创建并立即打开文件
    pub async fn from_config(config: FileAppenderConfig) -> Result<Self> {
        let file = open_log_file(&config).await?;
        Ok(Self {
            config,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn new(config: FileAppenderConfig) -> Self {
        Self {
            config,
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &str {
        &self.config.file_path
    }
}

async fn open_log_file(config: &FileAppenderConfig) -> Result<File> {
    let path = Path::new(&config.file_path);
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create log directory {}", dir.display()))?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if config.append_to_file {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    let file = options
        .open(path)
        .await
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing::debug!(path = %path.display(), append = config.append_to_file, "log file opened");
    Ok(file)
}

#[async_trait::async_trait]
impl LogAppender for FileAppender {
    async fn append(&self, formatted_message: &str) -> Result<()> {
        let mut slot = self.file.lock().await;
        if slot.is_none() {
            *slot = Some(open_log_file(&self.config).await?);
        }

        if let Some(file) = slot.as_mut() {
            let mut line = String::with_capacity(formatted_message.len() + 1);
            line.push_str(formatted_message);
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        if let Some(file) = self.file.lock().await.as_mut() {
            file.flush().await?;
        }
        Ok(())
    }
}

crate::impl_from!(FileAppenderConfig => FileAppender);
crate::impl_box_from!(FileAppender => dyn LogAppender);
