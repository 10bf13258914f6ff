use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::property::ExtraProperty;

/// 可被序列化为 JSON 的异常
///
/// 除 `message` 与 `type_name` 外都有默认实现。自定义错误类型通过
/// `extra_properties` 暴露额外字段，替代运行时反射。
pub trait Exception: fmt::Debug + Send + Sync {
    /// 异常消息
    fn message(&self) -> &str;

    /// 类型短名，例如 `TimeoutError`
    fn type_name(&self) -> &str;

    /// 类型全名，例如 `MyApp.Net.TimeoutError`
    fn full_type_name(&self) -> &str {
        self.type_name()
    }

    /// 抛出异常的方法所属的类
    fn class_name(&self) -> Option<&str> {
        None
    }

    /// 抛出异常的方法名
    fn method_name(&self) -> Option<&str> {
        None
    }

    /// 产生异常的组件名称（JSON 字段 `Source`）
    fn source_name(&self) -> Option<&str> {
        None
    }

    fn help_link(&self) -> Option<&str> {
        None
    }

    /// 原始堆栈文本，按行分割后输出
    fn stack_trace(&self) -> Option<&str> {
        None
    }

    /// 附加在异常上的键值数据
    fn data(&self) -> &[(String, Value)] {
        &[]
    }

    /// 内部异常；对聚合异常应返回其主异常
    fn inner_exception(&self) -> Option<&dyn Exception> {
        None
    }

    /// 聚合异常包含的子异常列表
    fn aggregate(&self) -> Option<&Aggregate> {
        None
    }

    /// 额外的公开属性
    fn extra_properties(&self) -> Vec<ExtraProperty> {
        Vec::new()
    }
}

/// 聚合异常的子异常列表
///
/// `primary` 显式标记列表中哪一个是主异常（即 `inner_exception`），
/// 序列化时据此避免同一个异常输出两次。
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    exceptions: Vec<Arc<dyn Exception>>,
    primary: Option<usize>,
}

impl Aggregate {
    /// 创建聚合，非空时第一个子异常为主异常
    pub fn new(exceptions: Vec<Arc<dyn Exception>>) -> Self {
        let primary = if exceptions.is_empty() { None } else { Some(0) };
        Self {
            exceptions,
            primary,
        }
    }

    /// 指定主异常下标；越界或 `None` 表示主异常不在列表中
    pub fn with_primary(mut self, primary: Option<usize>) -> Self {
        self.primary = primary;
        self
    }

    pub fn exceptions(&self) -> &[Arc<dyn Exception>] {
        &self.exceptions
    }

    pub fn len(&self) -> usize {
        self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }

    /// 主异常在列表中的下标（仅当下标有效时返回）
    pub fn primary_index(&self) -> Option<usize> {
        self.primary.filter(|&index| index < self.exceptions.len())
    }

    /// 主异常
    pub fn primary(&self) -> Option<&dyn Exception> {
        self.primary_index()
            .and_then(|index| self.exceptions.get(index))
            .map(|exception| &**exception)
    }
}
