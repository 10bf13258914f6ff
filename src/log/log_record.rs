use chrono::{DateTime, Local, SecondsFormat};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::exception::{summarize_exception, Exception};
use crate::log::level::LogLevel;

/// 日志属性值
///
/// 标量直接输出；`Json` / `Struct` 按 JSON 输出；`Exception` 交给渲染器映射处理，
/// 没有注册渲染器时输出 `类型全名: 消息`。
#[derive(Debug, Clone)]
pub enum MetadataValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Null,
    Json(Value),
    /// 由 `from_struct` 序列化得到
    Struct(Value),
    Exception(Arc<dyn Exception>),
}

impl MetadataValue {
    /// 序列化任意结构体，失败时记为 `Null`
    pub fn from_struct<T: Serialize>(value: T) -> Self {
        serde_json::to_value(value)
            .map(MetadataValue::Struct)
            .unwrap_or(MetadataValue::Null)
    }

    pub fn exception(exception: impl Exception + 'static) -> Self {
        MetadataValue::Exception(Arc::new(exception))
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::String(text) => text.serialize(serializer),
            MetadataValue::I64(number) => number.serialize(serializer),
            MetadataValue::U64(number) => number.serialize(serializer),
            MetadataValue::F64(number) => number.serialize(serializer),
            MetadataValue::Bool(flag) => flag.serialize(serializer),
            MetadataValue::Null => serializer.serialize_unit(),
            MetadataValue::Json(value) | MetadataValue::Struct(value) => value.serialize(serializer),
            MetadataValue::Exception(exception) => {
                summarize_exception(Some(&**exception)).serialize(serializer)
            }
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(text) => f.write_str(text),
            MetadataValue::I64(number) => fmt::Display::fmt(number, f),
            MetadataValue::U64(number) => fmt::Display::fmt(number, f),
            MetadataValue::F64(number) => fmt::Display::fmt(number, f),
            MetadataValue::Bool(flag) => fmt::Display::fmt(flag, f),
            MetadataValue::Null => f.write_str("null"),
            MetadataValue::Json(value) | MetadataValue::Struct(value) => fmt::Display::fmt(value, f),
            MetadataValue::Exception(exception) => {
                write!(f, "{}: {}", exception.full_type_name(), exception.message())
            }
        }
    }
}

macro_rules! metadata_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for MetadataValue {
                fn from(value: $source) -> Self {
                    MetadataValue::$variant(value.into())
                }
            }
        )*
    };
}

metadata_from!(
    String => String,
    &str => String,
    i64 => I64,
    i32 => I64,
    u64 => U64,
    u32 => U64,
    f64 => F64,
    bool => Bool,
    Value => Json,
    Arc<dyn Exception> => Exception,
);

/// 调用位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationInfo {
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(rename = "method")]
    pub method_name: String,
    #[serde(rename = "file")]
    pub file_name: String,
    #[serde(rename = "line")]
    pub line_number: u32,
}

impl LocationInfo {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: impl Into<String>,
        line_number: u32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: file_name.into(),
            line_number,
        }
    }
}

/// 日志记录
///
/// 每条日志事件生成一次，格式化之后即丢弃。
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// logger 名称（分类名）
    pub logger_name: String,
    pub level: LogLevel,
    /// 已渲染的消息文本
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub thread_name: String,
    pub domain: Option<String>,
    pub identity: Option<String>,
    pub user_name: Option<String>,
    /// 上下文属性，保持插入顺序
    pub properties: Vec<(String, MetadataValue)>,
    pub exception: Option<Arc<dyn Exception>>,
    pub location: Option<LocationInfo>,
}

impl LogRecord {
    /// 创建新的日志记录
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let thread = std::thread::current();
        let thread_name = match thread.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", thread.id()),
        };

        Self {
            logger_name: String::new(),
            level,
            message: message.into(),
            timestamp: Local::now(),
            thread_name,
            domain: None,
            identity: None,
            user_name: None,
            properties: Vec::new(),
            exception: None,
            location: None,
        }
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    /// 添加上下文属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn with_exception(mut self, exception: impl Exception + 'static) -> Self {
        self.exception = Some(Arc::new(exception));
        self
    }

    pub fn with_exception_arc(mut self, exception: Arc<dyn Exception>) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn with_location(mut self, location: LocationInfo) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// 可往返解析的本地时间文本，例如 `2024-05-01T08:30:00.125+08:00`
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }
}

// 按插入顺序输出属性
struct OrderedProperties<'a>(&'a [(String, MetadataValue)]);

impl Serialize for OrderedProperties<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for LogRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("timestamp", &self.timestamp_text())?;
        map.serialize_entry("level", &self.level.to_string())?;
        map.serialize_entry("logger", &self.logger_name)?;
        map.serialize_entry("thread", &self.thread_name)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(domain) = &self.domain {
            map.serialize_entry("domain", domain)?;
        }
        if let Some(identity) = &self.identity {
            map.serialize_entry("identity", identity)?;
        }
        if let Some(user_name) = &self.user_name {
            map.serialize_entry("username", user_name)?;
        }

        if self.properties.is_empty() {
            map.serialize_entry("properties", &Value::Null)?;
        } else {
            map.serialize_entry("properties", &OrderedProperties(&self.properties))?;
        }

        let exception = summarize_exception(self.exception.as_deref());
        map.serialize_entry("exception", &exception)?;
        map.serialize_entry("location", &self.location)?;

        map.end()
    }
}
