use serde::Serialize;
use serde_json::{Map, Value};

use super::exception::Exception;

/// 异常的精简摘要
///
/// 完整序列化的异常可能非常大，摘要只保留定位问题最常用的字段。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExceptionSummary {
    pub message: String,
    /// 类型短名
    pub class: String,
    /// 类型全名
    #[serde(rename = "Type")]
    pub type_name: String,
    pub stack_trace: Vec<String>,
    pub inner_exception: Option<Box<ExceptionSummary>>,
    pub data: Map<String, Value>,
    pub source: Option<String>,
}

/// 生成异常摘要，`None` 返回 `None`
pub fn summarize_exception(exception: Option<&dyn Exception>) -> Option<ExceptionSummary> {
    let exception = exception?;

    Some(ExceptionSummary {
        message: exception.message().to_string(),
        class: exception.type_name().to_string(),
        type_name: exception.full_type_name().to_string(),
        stack_trace: exception
            .stack_trace()
            .map(|trace| {
                trace
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        inner_exception: summarize_exception(exception.inner_exception()).map(Box::new),
        data: exception.data().iter().cloned().collect(),
        source: exception.source_name().map(str::to_string),
    })
}
