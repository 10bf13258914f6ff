//! 对象渲染器
//!
//! `RendererMap` 按值的运行时类别查找渲染器，把属性值和异常转换为文本。
//! 映射在构造 formatter 时显式传入，不存在进程级的全局注册表。

use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::exception::{ExceptionSerializer, ExceptionSerializerOptions};
use crate::log::log_record::MetadataValue;

/// `MetadataValue` 的运行时类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Bool,
    Null,
    Json,
    Struct,
    Exception,
}

impl MetadataValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            MetadataValue::String(_) => ValueKind::String,
            MetadataValue::I64(_) | MetadataValue::U64(_) => ValueKind::Integer,
            MetadataValue::F64(_) => ValueKind::Float,
            MetadataValue::Bool(_) => ValueKind::Bool,
            MetadataValue::Null => ValueKind::Null,
            MetadataValue::Json(_) => ValueKind::Json,
            MetadataValue::Struct(_) => ValueKind::Struct,
            MetadataValue::Exception(_) => ValueKind::Exception,
        }
    }
}

/// 将一个值渲染为文本
pub trait ObjectRenderer: Send + Sync {
    fn render(&self, renderers: &RendererMap, value: &MetadataValue) -> Result<String>;
}

impl<F> ObjectRenderer for F
where
    F: Fn(&MetadataValue) -> Result<String> + Send + Sync,
{
    fn render(&self, _: &RendererMap, value: &MetadataValue) -> Result<String> {
        self(value)
    }
}

/// 以 JSON 形式渲染异常
#[derive(Debug, Clone, Default)]
pub struct ExceptionJsonRenderer {
    serializer: ExceptionSerializer,
}

impl ExceptionJsonRenderer {
    pub fn new(options: ExceptionSerializerOptions) -> Self {
        Self {
            serializer: ExceptionSerializer::new(options),
        }
    }
}

impl ObjectRenderer for ExceptionJsonRenderer {
    fn render(&self, _: &RendererMap, value: &MetadataValue) -> Result<String> {
        match value {
            MetadataValue::Exception(exception) => Ok(self.serializer.serialize(Some(&**exception))?),
            other => Ok(other.to_string()),
        }
    }
}

/// 类别到渲染器的映射
#[derive(Clone)]
pub struct RendererMap {
    renderers: HashMap<ValueKind, Arc<dyn ObjectRenderer>>,
}

impl RendererMap {
    /// 默认映射：异常以 JSON 渲染
    pub fn new() -> Self {
        let mut map = Self::empty();
        map.put(ValueKind::Exception, ExceptionJsonRenderer::default());
        map
    }

    /// 不含任何渲染器，所有值按 `Display` 输出
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    pub fn put(&mut self, kind: ValueKind, renderer: impl ObjectRenderer + 'static) -> &mut Self {
        self.renderers.insert(kind, Arc::new(renderer));
        self
    }

    pub fn get(&self, kind: ValueKind) -> Option<&Arc<dyn ObjectRenderer>> {
        self.renderers.get(&kind)
    }

    pub fn remove(&mut self, kind: ValueKind) -> Option<Arc<dyn ObjectRenderer>> {
        self.renderers.remove(&kind)
    }

    /// 查找渲染器并渲染；未注册或渲染失败时退回 `Display`
    pub fn find_and_render(&self, value: &MetadataValue) -> String {
        let Some(renderer) = self.get(value.kind()) else {
            return value.to_string();
        };

        match renderer.render(self, value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(kind = ?value.kind(), error = %e, "object renderer failed");
                value.to_string()
            }
        }
    }
}

impl Default for RendererMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererMap")
            .field("kinds", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}
