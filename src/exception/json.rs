//! 通用对象 JSON 渲染
//!
//! 异常的复杂扩展属性通过这里序列化。`PreserveObjects` 模式下，每个 JSON
//! 对象按深度优先顺序编号为 `"$id"`，之后出现的相同非空对象替换为 `{"$ref": id}`，
//! 共享或重复的子对象因此只输出一次。字段保持声明顺序。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ExceptionError, Result};

/// 重复子对象的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceHandling {
    /// 重复对象完整输出多次
    #[default]
    Duplicate,
    /// 重复对象输出为 `$ref` 引用
    PreserveObjects,
}

/// 渲染选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JsonRenderOptions {
    pub references: ReferenceHandling,
}

impl JsonRenderOptions {
    pub fn preserve_references() -> Self {
        Self {
            references: ReferenceHandling::PreserveObjects,
        }
    }
}

/// 可渲染为 JSON 文本的值
///
/// 对所有 `Serialize` 类型自动实现，作为 `PropertyValue::Object` 的载体。
pub trait JsonRender: Send + Sync {
    fn render_json(&self, options: &JsonRenderOptions) -> Result<String>;
}

impl<T: Serialize + Send + Sync + ?Sized> JsonRender for T {
    fn render_json(&self, options: &JsonRenderOptions) -> Result<String> {
        render_as_json_with(self, Some(options))
    }
}

/// 使用默认选项渲染
pub fn render_as_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// 使用指定选项渲染，`options` 为 `None` 时返回参数错误
pub fn render_as_json_with<T: Serialize + ?Sized>(
    value: &T,
    options: Option<&JsonRenderOptions>,
) -> Result<String> {
    let options = options.ok_or(ExceptionError::InvalidArgument { name: "options" })?;

    match options.references {
        ReferenceHandling::Duplicate => render_as_json(value),
        ReferenceHandling::PreserveObjects => {
            let value = serde_json::to_value(value)?;
            let mut seen = Vec::new();
            Ok(serde_json::to_string(&preserve_objects(value, &mut seen))?)
        }
    }
}

fn preserve_objects(value: Value, seen: &mut Vec<Map<String, Value>>) -> Value {
    match value {
        Value::Object(map) => {
            // 空对象不做引用替换
            let earlier = if map.is_empty() {
                None
            } else {
                seen.iter().position(|earlier| earlier == &map)
            };
            if let Some(index) = earlier {
                let mut reference = Map::new();
                reference.insert("$ref".to_string(), Value::String((index + 1).to_string()));
                return Value::Object(reference);
            }

            seen.push(map.clone());
            let mut annotated = Map::new();
            annotated.insert("$id".to_string(), Value::String(seen.len().to_string()));
            for (key, child) in map {
                annotated.insert(key, preserve_objects(child, seen));
            }
            Value::Object(annotated)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| preserve_objects(item, seen))
                .collect(),
        ),
        other => other,
    }
}
