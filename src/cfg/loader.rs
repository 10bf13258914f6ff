//! 配置文件加载
//!
//! 根据扩展名选择解析器，支持 JSON/JSON5、YAML、TOML。

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 与 JSON5 都交给 json5 解析
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// 根据文件扩展名推断格式
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("config file has no extension: {}", path.display()))?;

        match ext.as_str() {
            "json" | "json5" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(anyhow!("unsupported config format: {}", ext)),
        }
    }
}

/// 按指定格式解析配置字符串
pub fn parse_config_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json => Ok(json5::from_str(content)?),
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        ConfigFormat::Toml => Ok(toml::from_str(content)?),
    }
}

/// 读取并解析配置文件
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;

    let config = parse_config_str(&content, format)?;
    tracing::debug!(path = %path.display(), ?format, "config file loaded");
    Ok(config)
}
