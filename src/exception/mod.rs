//! 异常 JSON 序列化
//!
//! 把异常及其内部异常、聚合子异常、扩展属性转换为固定字段顺序的单行 JSON 文本。
//! 自定义错误类型实现 [`Exception`] trait 暴露这些信息；
//! 任意 `std::error::Error` 可以通过 [`ExceptionRecord::from_error`] 转换。

pub mod error;
pub mod exception;
pub mod json;
pub mod property;
pub mod record;
pub mod serializer;
pub mod summary;

mod writer;

pub use error::{ExceptionError, PropertyError, Result};
pub use exception::{Aggregate, Exception};
pub use json::{render_as_json, render_as_json_with, JsonRender, JsonRenderOptions, ReferenceHandling};
pub use property::{ExtraProperty, PropertyValue};
pub use record::ExceptionRecord;
pub use serializer::{serialize_exception, ExceptionSerializer, ExceptionSerializerOptions};
pub use summary::{summarize_exception, ExceptionSummary};
