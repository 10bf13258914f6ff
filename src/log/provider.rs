use crate::cfg::load_config_file;
use crate::exception::Exception;
use crate::log::logger::{default_exception_formatter, ExceptionFormatter, Logger, LoggerConfig};
use anyhow::Result;
use dashmap::DashMap;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// LoggerProvider 配置
///
/// ```yaml
/// root:
///   level: info
///   formatter: { type: LocationXmlLayout, options: { location_info: true } }
///   appender: { type: FileAppender, options: { file_path: logs/app.xml } }
/// loggers:
///   shop.billing:
///     level: debug
/// domain: shop
/// ```
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LoggerProviderConfig {
    /// 没有匹配到分类配置时使用
    pub root: LoggerConfig,

    /// 按分类前缀覆盖配置，最长前缀优先
    pub loggers: HashMap<String, LoggerConfig>,

    pub domain: Option<String>,

    pub user_name: Option<String>,

    /// 带异常的日志是否把异常详情拼接进消息
    #[default = true]
    pub exception_details: bool,
}

/// 按分类创建并缓存 Logger
///
/// 同一分类最多创建一个 Logger，并发调用 `create_logger` 拿到的是同一个实例
pub struct LoggerProvider {
    config: LoggerProviderConfig,
    loggers: DashMap<String, Arc<Logger>>,
    exception_formatter: Option<ExceptionFormatter>,
}

impl LoggerProvider {
    pub fn new(config: LoggerProviderConfig) -> Self {
        let default_formatter: ExceptionFormatter = Arc::new(default_exception_formatter);
        let exception_formatter = config.exception_details.then_some(default_formatter);

        Self {
            config,
            loggers: DashMap::new(),
            exception_formatter,
        }
    }

    /// 从配置文件创建，格式由扩展名决定（json/json5、yaml/yml、toml）
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: LoggerProviderConfig = load_config_file(path)?;
        Ok(Self::new(config))
    }

    /// 替换异常详情格式化函数，只影响之后创建的 Logger
    pub fn with_exception_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&str, &dyn Exception) -> String + Send + Sync + 'static,
    {
        let formatter: ExceptionFormatter = Arc::new(formatter);
        self.exception_formatter = Some(formatter);
        self
    }

    pub fn config(&self) -> &LoggerProviderConfig {
        &self.config
    }

    /// 获取或创建分类对应的 Logger
    pub fn create_logger(&self, category: &str) -> Result<Arc<Logger>> {
        if let Some(logger) = self.loggers.get(category) {
            return Ok(logger.value().clone());
        }

        let logger = self
            .loggers
            .entry(category.to_string())
            .or_try_insert_with(|| self.build_logger(category).map(Arc::new))?;
        Ok(logger.value().clone())
    }

    /// 获取已创建的 Logger
    pub fn get(&self, category: &str) -> Option<Arc<Logger>> {
        self.loggers.get(category).map(|logger| logger.value().clone())
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// 清空缓存，已经分发出去的 Logger 仍然可用
    pub fn clear(&self) {
        self.loggers.clear();
    }

    /// 查找分类对应的配置：完全匹配或以 `.` / `::` 分隔的最长前缀
    pub fn config_for(&self, category: &str) -> &LoggerConfig {
        self.config
            .loggers
            .iter()
            .filter(|(prefix, _)| category_matches(category, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, config)| config)
            .unwrap_or(&self.config.root)
    }

    fn build_logger(&self, category: &str) -> Result<Logger> {
        let mut logger = Logger::new(category, self.config_for(category).clone())?;
        if let Some(domain) = &self.config.domain {
            logger = logger.with_domain(domain.clone());
        }
        if let Some(user_name) = &self.config.user_name {
            logger = logger.with_user_name(user_name.clone());
        }
        if let Some(formatter) = &self.exception_formatter {
            logger = logger.with_exception_formatter(formatter.clone());
        }

        tracing::debug!(category, "logger created");
        Ok(logger)
    }
}

impl Default for LoggerProvider {
    fn default() -> Self {
        Self::new(LoggerProviderConfig::default())
    }
}

fn category_matches(category: &str, prefix: &str) -> bool {
    match category.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with("::"),
        None => false,
    }
}
