use serde_json::Value;
use std::sync::Arc;

use super::exception::{Aggregate, Exception};
use super::property::{ExtraProperty, PropertyValue};

/// 通用的异常快照
///
/// 以 builder 方式构造，可直接交给序列化器；也可以通过 `from_error`
/// 把任意 `std::error::Error` 及其 `source()` 链转换过来。
///
/// # 示例
///
/// ```
/// use logbridge::exception::{serialize_exception, ExceptionRecord};
///
/// let exception = ExceptionRecord::new("TimeoutError", "request timed out")
///     .with_source("billing")
///     .with_data("attempt", 3);
///
/// let json = serialize_exception(Some(&exception)).unwrap();
/// assert!(json.contains(r#""ExceptionType" : "TimeoutError""#));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExceptionRecord {
    message: String,
    type_name: String,
    full_type_name: Option<String>,
    class_name: Option<String>,
    method_name: Option<String>,
    source: Option<String>,
    help_link: Option<String>,
    stack_trace: Option<String>,
    data: Vec<(String, Value)>,
    inner: Option<Arc<dyn Exception>>,
    aggregate: Option<Aggregate>,
    properties: Vec<ExtraProperty>,
}

impl ExceptionRecord {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// 创建聚合异常，第一个子异常为主异常
    pub fn aggregate(message: impl Into<String>, exceptions: Vec<Arc<dyn Exception>>) -> Self {
        Self::new("AggregateException", message).with_aggregate(Aggregate::new(exceptions))
    }

    /// 转换 `std::error::Error`
    ///
    /// 顶层使用静态类型名；`source()` 链上的错误只能拿到 trait object，
    /// 类型名统一记为 `Error`。
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let full_type_name = std::any::type_name::<E>();
        let type_name = short_type_name(full_type_name);

        let mut record = Self::new(type_name, error.to_string())
            .with_full_type_name(full_type_name.replace("::", "."));
        if let Some(source) = error.source() {
            record.inner = Some(Arc::new(Self::from_source(source)));
        }
        record
    }

    fn from_source(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut record = Self::new("Error", error.to_string());
        if let Some(source) = error.source() {
            record.inner = Some(Arc::new(Self::from_source(source)));
        }
        record
    }

    pub fn with_full_type_name(mut self, full_type_name: impl Into<String>) -> Self {
        self.full_type_name = Some(full_type_name.into());
        self
    }

    /// 设置抛出位置（类名与方法名）
    pub fn with_target(mut self, class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self.method_name = Some(method_name.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_help_link(mut self, help_link: impl Into<String>) -> Self {
        self.help_link = Some(help_link.into());
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// 追加数据；重复的 key 会覆盖之前的值
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.data.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.data.push((key, value)),
        }
        self
    }

    pub fn with_inner(mut self, inner: impl Exception + 'static) -> Self {
        self.inner = Some(Arc::new(inner));
        self
    }

    pub fn with_inner_arc(mut self, inner: Arc<dyn Exception>) -> Self {
        self.inner = Some(inner);
        self
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn with_property(mut self, property: ExtraProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// 便捷方法：按值推断声明类型
    pub fn with_value<T: Into<PropertyValue>>(self, name: impl Into<String>, value: T) -> Self {
        self.with_property(ExtraProperty::of(name, value))
    }
}

impl Exception for ExceptionRecord {
    fn message(&self) -> &str {
        &self.message
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn full_type_name(&self) -> &str {
        self.full_type_name.as_deref().unwrap_or(&self.type_name)
    }

    fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    fn source_name(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn help_link(&self) -> Option<&str> {
        self.help_link.as_deref()
    }

    fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    fn data(&self) -> &[(String, Value)] {
        &self.data
    }

    // 聚合异常的内部异常就是主异常；没有指定主异常时退回显式设置的 inner
    fn inner_exception(&self) -> Option<&dyn Exception> {
        self.aggregate
            .as_ref()
            .and_then(|aggregate| aggregate.primary())
            .or(self.inner.as_deref())
    }

    fn aggregate(&self) -> Option<&Aggregate> {
        self.aggregate.as_ref()
    }

    fn extra_properties(&self) -> Vec<ExtraProperty> {
        self.properties.clone()
    }
}

fn short_type_name(full_name: &str) -> &str {
    let base = full_name.split('<').next().unwrap_or(full_name);
    base.rsplit("::").next().unwrap_or(base)
}
