use serde::Deserialize;
use smart_default::SmartDefault;

use super::error::{ExceptionError, PropertyError, Result};
use super::exception::Exception;
use super::json::JsonRenderOptions;
use super::property::{ExtraProperty, PropertyValue};
use super::writer::{array, ordered_object, quote, JsonObjectWriter};

/// 已作为固定字段输出、不再当作扩展属性输出的名字
const RESERVED_PROPERTIES: [&str; 8] = [
    "Message",
    "Data",
    "StackTrace",
    "TargetSite",
    "HelpLink",
    "Source",
    "InnerException",
    "InnerExceptions",
];

/// ExceptionSerializer 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq, Eq)]
#[serde(default)]
pub struct ExceptionSerializerOptions {
    /// 内部异常的最大嵌套深度，`None` 表示不限制
    ///
    /// 达到上限后 `InnerException` 与 `InnerExceptions` 输出为 `null`。
    #[default(None)]
    pub max_depth: Option<usize>,
}

/// 异常 JSON 序列化器
///
/// 输出为单行 JSON 对象文本，字段顺序固定：
///
/// ```text
/// { "Message" : ..., "ExceptionType" : "...", "Class" : "...", "Method" : "...",
///   "Source" : "...", "HelpLink" : "...", "InnerException" : ..., "InnerExceptions" : ...,
///   "StackTrace" : ..., "Data" : {...}, <扩展属性>...}
/// ```
///
/// 扩展属性的名字不做转义，因此输出并不保证是严格合法的 JSON。
#[derive(Debug, Clone, Default)]
pub struct ExceptionSerializer {
    options: ExceptionSerializerOptions,
}

impl ExceptionSerializer {
    pub fn new(options: ExceptionSerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExceptionSerializerOptions {
        &self.options
    }

    /// 序列化异常，`None` 返回参数错误
    pub fn serialize(&self, exception: Option<&dyn Exception>) -> Result<String> {
        let exception = exception.ok_or(ExceptionError::InvalidArgument { name: "exception" })?;
        Ok(self.write_exception(exception, 0))
    }

    fn write_exception(&self, exception: &dyn Exception, depth: usize) -> String {
        let nested_allowed = self.nested_allowed(exception, depth);

        // 聚合异常：逐个序列化子异常；主异常已在列表中时不再单独输出
        let mut include_inner = true;
        let inner_exceptions = match exception.aggregate() {
            Some(aggregate) if nested_allowed => {
                if aggregate.primary_index().is_some() {
                    include_inner = false;
                }
                array(
                    aggregate
                        .exceptions()
                        .iter()
                        .map(|e| self.write_exception(&**e, depth + 1)),
                )
            }
            _ => "null".to_string(),
        };

        let inner_exception = match exception.inner_exception() {
            Some(inner) if include_inner && nested_allowed => self.write_exception(inner, depth + 1),
            _ => "null".to_string(),
        };

        let stack_trace = match exception.stack_trace() {
            Some(trace) if !trace.trim().is_empty() => array(
                trace
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(quote),
            ),
            _ => "null".to_string(),
        };

        let mut writer = JsonObjectWriter::new();
        writer
            .string_field("Message", exception.message())
            .string_field("ExceptionType", exception.type_name())
            .string_field("Class", exception.class_name().unwrap_or_default())
            .string_field("Method", exception.method_name().unwrap_or_default())
            .string_field("Source", exception.source_name().unwrap_or_default())
            .string_field("HelpLink", help_link(exception))
            .raw_field("InnerException", &inner_exception)
            .raw_field("InnerExceptions", &inner_exceptions)
            .raw_field("StackTrace", &stack_trace)
            .raw_field("Data", &ordered_object(exception.data()));

        for property in exception.extra_properties() {
            if RESERVED_PROPERTIES.contains(&property.name.as_str()) {
                continue;
            }
            if let Some(value) = render_property(&property) {
                writer.raw_field(&property.name, &value);
            }
        }

        writer.finish()
    }

    fn nested_allowed(&self, exception: &dyn Exception, depth: usize) -> bool {
        match self.options.max_depth {
            Some(max_depth) if depth >= max_depth => {
                let has_nested = exception.inner_exception().is_some()
                    || exception.aggregate().is_some_and(|a| !a.is_empty());
                if has_nested {
                    tracing::warn!(
                        max_depth,
                        exception_type = exception.type_name(),
                        "exception nesting exceeds max depth, inner exceptions omitted"
                    );
                }
                false
            }
            _ => true,
        }
    }
}

/// 使用默认配置序列化异常
pub fn serialize_exception(exception: Option<&dyn Exception>) -> Result<String> {
    ExceptionSerializer::default().serialize(exception)
}

fn help_link(exception: &dyn Exception) -> &str {
    exception
        .help_link()
        .filter(|link| !link.trim().is_empty())
        .unwrap_or_default()
}

/// 渲染单个扩展属性；读取失败的属性返回 `None`
fn render_property(property: &ExtraProperty) -> Option<String> {
    let value = match &property.value {
        Ok(value) => value,
        Err(PropertyError::NotImplemented) => {
            tracing::trace!(property = %property.name, "property not implemented, skipped");
            return None;
        }
        Err(PropertyError::Failed(error)) => {
            tracing::debug!(property = %property.name, %error, "property getter failed, skipped");
            return None;
        }
    };

    let rendered = match value {
        PropertyValue::String(s) => quote(s),
        PropertyValue::Enum { type_name, member } => format!("\"{}.{}\"", type_name, member),
        PropertyValue::Guid(id) => format!("\"{}\"", id),
        PropertyValue::Literal(literal) => literal.clone(),
        PropertyValue::Object(object) => {
            match object.render_json(&JsonRenderOptions::preserve_references()) {
                Ok(json) => json,
                Err(e) => format!(
                    "\"[ERROR could not serialize property '{}' ({}) {}]\"",
                    property.name, property.declared_type, e
                ),
            }
        }
    };
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::{Aggregate, ExceptionRecord};
    use serde::Serialize;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Serialize)]
    struct Endpoint {
        host: &'static str,
        port: u16,
    }

    fn shared(exception: ExceptionRecord) -> Arc<dyn Exception> {
        Arc::new(exception)
    }

    #[test]
    fn test_serialize_plain_exception() -> Result<()> {
        let exception = ExceptionRecord::new("InvalidOperation", "boom");
        let json = serialize_exception(Some(&exception))?;

        assert_eq!(
            json,
            r#"{ "Message" : "boom", "ExceptionType" : "InvalidOperation", "Class" : "", "Method" : "", "Source" : "", "HelpLink" : "", "InnerException" : null, "InnerExceptions" : null, "StackTrace" : null, "Data" : {}}"#
        );
        Ok(())
    }

    #[test]
    fn test_serialize_none_is_invalid_argument() {
        let result = serialize_exception(None);
        assert!(matches!(
            result,
            Err(ExceptionError::InvalidArgument { name: "exception" })
        ));
    }

    #[test]
    fn test_stack_trace_and_data() -> Result<()> {
        let exception = ExceptionRecord::new("E", "m")
            .with_stack_trace("  at a()\r\n\r\n  at b()\n")
            .with_data("user", "alice")
            .with_data("attempt", 2);
        let json = serialize_exception(Some(&exception))?;

        assert!(json.contains(r#""StackTrace" : ["  at a()","  at b()"]"#));
        assert!(json.contains(r#""Data" : {"user":"alice","attempt":2}}"#));
        Ok(())
    }

    #[test]
    fn test_blank_stack_trace_is_null() -> Result<()> {
        let exception = ExceptionRecord::new("E", "m").with_stack_trace(" \n\t");
        let json = serialize_exception(Some(&exception))?;
        assert!(json.contains(r#""StackTrace" : null"#));
        Ok(())
    }

    #[test]
    fn test_fixed_fields_are_escaped() -> Result<()> {
        let exception = ExceptionRecord::new("E", "line1\nline \"2\"")
            .with_target("app.Worker", "run")
            .with_source("worker")
            .with_help_link("https://example.com/e");
        let json = serialize_exception(Some(&exception))?;

        assert!(json.starts_with(r#"{ "Message" : "line1\nline \"2\"", "ExceptionType" : "E""#));
        assert!(json.contains(r#""Class" : "app.Worker", "Method" : "run""#));
        assert!(json.contains(r#""Source" : "worker", "HelpLink" : "https://example.com/e""#));
        Ok(())
    }

    #[test]
    fn test_inner_exception_is_nested() -> Result<()> {
        let exception = ExceptionRecord::new("Outer", "outer")
            .with_inner(ExceptionRecord::new("Inner", "inner"));
        let json = serialize_exception(Some(&exception))?;

        assert!(json.contains(r#""InnerException" : { "Message" : "inner", "ExceptionType" : "Inner""#));
        assert!(json.contains(r#""InnerExceptions" : null"#));
        Ok(())
    }

    #[test]
    fn test_aggregate_with_primary_in_list() -> Result<()> {
        let exception = ExceptionRecord::aggregate(
            "many",
            vec![
                shared(ExceptionRecord::new("A", "a")),
                shared(ExceptionRecord::new("B", "b")),
            ],
        );
        let json = serialize_exception(Some(&exception))?;

        assert!(json.contains(r#""InnerException" : null, "InnerExceptions" : [{ "Message" : "a""#));
        let a = json.find(r#""Message" : "a""#);
        let b = json.find(r#""Message" : "b""#);
        assert!(a.is_some() && b.is_some() && a < b);
        assert_eq!(json.matches(r#""Message" : "a""#).count(), 1);
        Ok(())
    }

    #[test]
    fn test_aggregate_without_primary_renders_inner() -> Result<()> {
        let aggregate = Aggregate::new(vec![shared(ExceptionRecord::new("A", "a"))]).with_primary(None);
        let exception = ExceptionRecord::new("AggregateException", "many")
            .with_aggregate(aggregate)
            .with_inner(ExceptionRecord::new("Cause", "cause"));
        let json = serialize_exception(Some(&exception))?;

        assert!(json.contains(r#""InnerException" : { "Message" : "cause""#));
        assert!(json.contains(r#""InnerExceptions" : [{ "Message" : "a""#));
        Ok(())
    }

    #[test]
    fn test_empty_aggregate() -> Result<()> {
        let exception = ExceptionRecord::aggregate("none", Vec::new());
        let json = serialize_exception(Some(&exception))?;
        assert!(json.contains(r#""InnerException" : null, "InnerExceptions" : []"#));
        Ok(())
    }

    #[test]
    fn test_extra_property_kinds() -> Result<()> {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let exception = ExceptionRecord::new("E", "m")
            .with_value("Path", "C:\\tmp")
            .with_property(ExtraProperty::enumeration("Status", "System.Net.HttpStatusCode", "NotFound"))
            .with_value("CorrelationId", id)
            .with_value("Code", -3i32)
            .with_value("Retry", false)
            .with_property(ExtraProperty::object("Endpoint", Endpoint { host: "db", port: 5432 }));
        let json = serialize_exception(Some(&exception))?;

        assert!(json.ends_with(
            r#""Data" : {}, "Path" : "C:\\tmp", "Status" : "System.Net.HttpStatusCode.NotFound", "CorrelationId" : "67e55044-10b1-426f-9247-bb680e5fe0c8", "Code" : -3, "Retry" : false, "Endpoint" : {"$id":"1","host":"db","port":5432}}"#
        ));
        Ok(())
    }

    #[derive(Serialize)]
    struct Backoff {
        max_ms: u64,
        initial_ms: u64,
    }

    #[test]
    fn test_object_property_keeps_field_order() -> Result<()> {
        let exception = ExceptionRecord::new("E", "m").with_property(ExtraProperty::object(
            "Backoff",
            Backoff { max_ms: 800, initial_ms: 50 },
        ));
        let json = serialize_exception(Some(&exception))?;

        assert!(json.ends_with(r#""Backoff" : {"$id":"1","max_ms":800,"initial_ms":50}}"#));
        Ok(())
    }

    struct Connection;

    impl Serialize for Connection {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("socket is closed"))
        }
    }

    #[test]
    fn test_object_render_failure_embeds_marker() -> Result<()> {
        let exception = ExceptionRecord::new("E", "m").with_property(ExtraProperty::new(
            "Connection",
            "net.Connection",
            PropertyValue::object(Connection),
        ));
        let json = serialize_exception(Some(&exception))?;

        assert!(json.ends_with(
            r#""Connection" : "[ERROR could not serialize property 'Connection' (net.Connection) json serialization failed: socket is closed]"}"#
        ));
        Ok(())
    }

    #[test]
    fn test_failed_properties_are_skipped() -> Result<()> {
        let exception = ExceptionRecord::new("E", "m")
            .with_property(ExtraProperty::failed("Handle", "os.Handle", PropertyError::NotImplemented))
            .with_property(ExtraProperty::failed(
                "Socket",
                "net.Socket",
                PropertyError::Failed("closed".to_string()),
            ))
            .with_value("Kept", 1u8);
        let json = serialize_exception(Some(&exception))?;

        assert!(!json.contains("Handle"));
        assert!(!json.contains("Socket"));
        assert!(json.ends_with(r#""Kept" : 1}"#));
        Ok(())
    }

    #[test]
    fn test_reserved_property_names_are_skipped() -> Result<()> {
        let exception = ExceptionRecord::new("E", "m")
            .with_value("Message", "shadow")
            .with_value("TargetSite", "x");
        let json = serialize_exception(Some(&exception))?;

        assert!(!json.contains("shadow"));
        assert!(!json.contains("TargetSite"));
        Ok(())
    }

    #[test]
    fn test_max_depth_truncates_nesting() -> Result<()> {
        let exception = ExceptionRecord::new("L0", "zero").with_inner(
            ExceptionRecord::new("L1", "one").with_inner(ExceptionRecord::new("L2", "two")),
        );

        let serializer = ExceptionSerializer::new(ExceptionSerializerOptions { max_depth: Some(1) });
        let json = serializer.serialize(Some(&exception))?;
        assert!(json.contains(r#""Message" : "one""#));
        assert!(!json.contains(r#""Message" : "two""#));

        let unbounded = serialize_exception(Some(&exception))?;
        assert!(unbounded.contains(r#""Message" : "two""#));
        Ok(())
    }

    #[test]
    fn test_options_deserialize() {
        let options: ExceptionSerializerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.max_depth, None);

        let options: ExceptionSerializerOptions =
            serde_json::from_str(r#"{"max_depth": 4}"#).unwrap();
        assert_eq!(options.max_depth, Some(4));
    }
}
