use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::error::PropertyError;
use super::json::JsonRender;

/// 扩展属性的运行时值
#[derive(Clone)]
pub enum PropertyValue {
    /// 输出为 JSON 字符串
    String(String),
    /// 输出为 `"<全名>.<成员名>"`
    Enum { type_name: String, member: String },
    /// 输出为带引号的规范文本
    Guid(Uuid),
    /// 值类型，原样输出不加引号
    Literal(String),
    /// 其余类型交给通用 JSON 渲染器
    Object(Arc<dyn JsonRender>),
}

impl PropertyValue {
    /// 由 Rust 枚举值构造，类型全名中的 `::` 转为 `.`
    pub fn from_enum<E: fmt::Debug>(value: &E) -> Self {
        PropertyValue::Enum {
            type_name: dotted_type_name::<E>(),
            member: format!("{:?}", value),
        }
    }

    /// 任意可序列化的值
    pub fn object<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        PropertyValue::Object(Arc::new(value))
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.debug_tuple("String").field(s).finish(),
            PropertyValue::Enum { type_name, member } => f
                .debug_struct("Enum")
                .field("type_name", type_name)
                .field("member", member)
                .finish(),
            PropertyValue::Guid(id) => f.debug_tuple("Guid").field(id).finish(),
            PropertyValue::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            PropertyValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}

macro_rules! literal_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::Literal(value.to_string())
                }
            }
        )*
    };
}

literal_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, bool);

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<Uuid> for PropertyValue {
    fn from(value: Uuid) -> Self {
        PropertyValue::Guid(value)
    }
}

/// 异常上的一个扩展属性
#[derive(Debug, Clone)]
pub struct ExtraProperty {
    pub name: String,
    /// 声明类型的全名，用于错误诊断文本
    pub declared_type: String,
    /// 读取失败时为 Err
    pub value: Result<PropertyValue, PropertyError>,
}

impl ExtraProperty {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            value: Ok(value.into()),
        }
    }

    /// 从值推断声明类型
    pub fn of<T>(name: impl Into<String>, value: T) -> Self
    where
        T: Into<PropertyValue>,
    {
        Self::new(name, dotted_type_name::<T>(), value)
    }

    pub fn enumeration(
        name: impl Into<String>,
        type_name: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            declared_type: type_name.clone(),
            value: Ok(PropertyValue::Enum {
                type_name,
                member: member.into(),
            }),
        }
    }

    pub fn object<T: Serialize + Send + Sync + 'static>(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            declared_type: dotted_type_name::<T>(),
            value: Ok(PropertyValue::object(value)),
        }
    }

    /// 读取失败的属性
    pub fn failed(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        error: PropertyError,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            value: Err(error),
        }
    }
}

/// 将 Rust 类型路径转换为点分形式：`my_app::Status` -> `my_app.Status`
pub(crate) fn dotted_type_name<T: ?Sized>() -> String {
    std::any::type_name::<T>().replace("::", ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    #[derive(Debug)]
    enum Status {
        Active,
        Suspended,
    }

    #[test]
    fn test_from_enum() {
        match PropertyValue::from_enum(&Status::Suspended) {
            PropertyValue::Enum { type_name, member } => {
                assert!(type_name.ends_with(".Status"));
                assert!(!type_name.contains("::"));
                assert_eq!(member, "Suspended");
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_literal_conversions() {
        assert!(matches!(PropertyValue::from(42i32), PropertyValue::Literal(s) if s == "42"));
        assert!(matches!(PropertyValue::from(true), PropertyValue::Literal(s) if s == "true"));
        assert!(matches!(PropertyValue::from(1.5f64), PropertyValue::Literal(s) if s == "1.5"));
        assert!(matches!(PropertyValue::from("x"), PropertyValue::String(s) if s == "x"));
    }

    #[test]
    fn test_extra_property_of_infers_type() {
        let property = ExtraProperty::of("Retries", 3u32);
        assert_eq!(property.name, "Retries");
        assert_eq!(property.declared_type, "u32");
        assert!(property.value.is_ok());
    }

    #[test]
    fn test_failed_property() {
        let property = ExtraProperty::failed("Handle", "os.Handle", PropertyError::NotImplemented);
        assert_eq!(property.value.err(), Some(PropertyError::NotImplemented));
    }

    #[test]
    fn test_object_debug_is_opaque() {
        let value = PropertyValue::object(vec![1, 2, 3]);
        assert_eq!(format!("{:?}", value), "Object(..)");
    }
}
