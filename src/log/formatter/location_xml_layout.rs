use anyhow::Result;

use crate::log::formatter::xml_layout::{ElementNames, XmlLayout, XmlLayoutConfig};
use crate::log::formatter::LogFormatter;
use crate::log::log_record::LogRecord;
use crate::log::renderer::RendererMap;

/// 带调用位置的 XML 格式化器
///
/// 记录带有位置信息时输出不带前缀的 `event` 元素，`locationInfo` 取自记录本身；
/// 没有位置信息时完全委托给 [`XmlLayout`]，输出与其逐字节一致。
pub struct LocationXmlLayout {
    base: XmlLayout,
    names: ElementNames,
}

impl LocationXmlLayout {
    pub fn new(config: XmlLayoutConfig) -> Self {
        Self {
            base: XmlLayout::new(config),
            names: ElementNames::unprefixed(),
        }
    }

    /// 替换渲染器映射
    pub fn with_renderers(mut self, renderers: RendererMap) -> Self {
        self.base = self.base.with_renderers(renderers);
        self
    }

    pub fn config(&self) -> &XmlLayoutConfig {
        self.base.config()
    }
}

impl LogFormatter for LocationXmlLayout {
    fn format(&self, record: &LogRecord) -> Result<String> {
        match &record.location {
            Some(location) => self.base.format_with(record, &self.names, Some(location)),
            None => self.base.format(record),
        }
    }
}

crate::impl_from!(XmlLayoutConfig => LocationXmlLayout);
crate::impl_box_from!(LocationXmlLayout => dyn LogFormatter);
