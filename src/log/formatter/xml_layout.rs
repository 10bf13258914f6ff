use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::borrow::Cow;

use crate::exception::ExceptionSerializerOptions;
use crate::log::formatter::transform::{
    escape_attribute_value, mask_xml_invalid_characters, write_escaped_xml_string,
};
use crate::log::formatter::LogFormatter;
use crate::log::log_record::{LocationInfo, LogRecord, MetadataValue};
use crate::log::renderer::{ExceptionJsonRenderer, RendererMap, ValueKind};

/// 位置信息不可用时输出的占位值
const NOT_AVAILABLE: &str = "?";

/// 构造已转义的属性，绕过 quick-xml 自带的转义
fn attribute<'a>(key: &'a str, value: &'a str) -> Attribute<'a> {
    let value = match escape_attribute_value(value) {
        Cow::Borrowed(value) => Cow::Borrowed(value.as_bytes()),
        Cow::Owned(value) => Cow::Owned(value.into_bytes()),
    };
    Attribute {
        key: QName(key.as_bytes()),
        value,
    }
}

/// XmlLayout / LocationXmlLayout 共用配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct XmlLayoutConfig {
    /// 元素名前缀，为空时不加前缀（LocationXmlLayout 输出位置信息时忽略前缀）
    #[default = "log4net"]
    pub prefix: String,

    /// 是否输出 locationInfo 元素
    #[default = false]
    pub location_info: bool,

    /// 消息先按 UTF-8 做 base64 编码
    #[default = false]
    pub base64_encode_message: bool,

    /// 属性值先按 UTF-8 做 base64 编码
    #[default = false]
    pub base64_encode_properties: bool,

    /// XML 非法字符的替换文本
    #[default = "?"]
    pub invalid_char_replacement: String,

    /// 异常 JSON 渲染选项
    pub exception: ExceptionSerializerOptions,
}

/// 各元素的完整名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementNames {
    event: String,
    message: String,
    properties: String,
    data: String,
    exception: String,
    location: String,
}

impl ElementNames {
    pub(crate) fn with_prefix(prefix: &str) -> Self {
        let name = |local: &str| {
            if prefix.is_empty() {
                local.to_string()
            } else {
                format!("{}:{}", prefix, local)
            }
        };

        Self {
            event: name("event"),
            message: name("message"),
            properties: name("properties"),
            data: name("data"),
            exception: name("exception"),
            location: name("locationInfo"),
        }
    }

    pub(crate) fn unprefixed() -> Self {
        Self::with_prefix("")
    }
}

/// XML 格式化器
///
/// 每条记录输出一个 `event` 元素：
///
/// ```text
/// <log4net:event logger="..." timestamp="..." level="..." thread="...">
///   <log4net:message>...</log4net:message>
///   <log4net:properties><log4net:data name="..." value="..."/></log4net:properties>
///   <log4net:exception>...</log4net:exception>
///   <log4net:locationInfo class="..." method="..." file="..." line="..."/>
/// </log4net:event>
/// ```
///
/// 属性值与异常通过 [`RendererMap`] 转换为文本，默认映射把异常渲染为 JSON。
pub struct XmlLayout {
    config: XmlLayoutConfig,
    names: ElementNames,
    renderers: RendererMap,
}

impl XmlLayout {
    pub fn new(config: XmlLayoutConfig) -> Self {
        let mut renderers = RendererMap::new();
        renderers.put(
            ValueKind::Exception,
            ExceptionJsonRenderer::new(config.exception.clone()),
        );

        Self {
            names: ElementNames::with_prefix(&config.prefix),
            config,
            renderers,
        }
    }

    /// 替换渲染器映射
    pub fn with_renderers(mut self, renderers: RendererMap) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn config(&self) -> &XmlLayoutConfig {
        &self.config
    }

    pub fn renderers(&self) -> &RendererMap {
        &self.renderers
    }

    /// 按给定元素名输出；`location` 为 `None` 时 locationInfo 使用占位值
    pub(crate) fn format_with(
        &self,
        record: &LogRecord,
        names: &ElementNames,
        location: Option<&LocationInfo>,
    ) -> Result<String> {
        let replacement = self.config.invalid_char_replacement.as_str();
        let mut writer = Writer::new(Vec::with_capacity(256 + record.message.len()));

        let timestamp = record.timestamp_text();
        let level = record.level.to_string();
        let mut event = BytesStart::new(names.event.as_str());
        event.push_attribute(attribute("logger", record.logger_name.as_str()));
        event.push_attribute(attribute("timestamp", timestamp.as_str()));
        event.push_attribute(attribute("level", level.as_str()));
        event.push_attribute(attribute("thread", record.thread_name.as_str()));
        for (key, value) in [
            ("domain", &record.domain),
            ("identity", &record.identity),
            ("username", &record.user_name),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                event.push_attribute(attribute(key, value));
            }
        }
        writer.write_event(Event::Start(event))?;

        // message
        writer.write_event(Event::Start(BytesStart::new(names.message.as_str())))?;
        if self.config.base64_encode_message {
            let encoded = STANDARD.encode(record.message.as_bytes());
            write_escaped_xml_string(&mut writer, &encoded, replacement)?;
        } else {
            write_escaped_xml_string(&mut writer, &record.message, replacement)?;
        }
        writer.write_event(Event::End(BytesEnd::new(names.message.as_str())))?;

        // properties
        if !record.properties.is_empty() {
            writer.write_event(Event::Start(BytesStart::new(names.properties.as_str())))?;
            for (key, value) in &record.properties {
                let name = mask_xml_invalid_characters(key, replacement);
                let rendered = self.renderers.find_and_render(value);
                let value = if self.config.base64_encode_properties {
                    STANDARD.encode(rendered.as_bytes())
                } else {
                    mask_xml_invalid_characters(&rendered, replacement).into_owned()
                };

                let mut data = BytesStart::new(names.data.as_str());
                data.push_attribute(attribute("name", name.as_ref()));
                data.push_attribute(attribute("value", value.as_str()));
                writer.write_event(Event::Empty(data))?;
            }
            writer.write_event(Event::End(BytesEnd::new(names.properties.as_str())))?;
        }

        // exception
        if let Some(exception_text) = self.exception_text(record) {
            writer.write_event(Event::Start(BytesStart::new(names.exception.as_str())))?;
            write_escaped_xml_string(&mut writer, &exception_text, replacement)?;
            writer.write_event(Event::End(BytesEnd::new(names.exception.as_str())))?;
        }

        // locationInfo
        if self.config.location_info {
            let line;
            let (class_name, method_name, file_name, line_number) = match location {
                Some(location) => {
                    line = location.line_number.to_string();
                    (
                        location.class_name.as_str(),
                        location.method_name.as_str(),
                        location.file_name.as_str(),
                        line.as_str(),
                    )
                }
                None => (NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE),
            };

            let mut element = BytesStart::new(names.location.as_str());
            element.push_attribute(attribute("class", class_name));
            element.push_attribute(attribute("method", method_name));
            element.push_attribute(attribute("file", file_name));
            element.push_attribute(attribute("line", line_number));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new(names.event.as_str())))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// 通过渲染器映射得到的异常文本；空白文本视为没有异常
    fn exception_text(&self, record: &LogRecord) -> Option<String> {
        let exception = record.exception.as_ref()?;
        let text = self
            .renderers
            .find_and_render(&MetadataValue::Exception(exception.clone()));
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl LogFormatter for XmlLayout {
    fn format(&self, record: &LogRecord) -> Result<String> {
        self.format_with(record, &self.names, record.location.as_ref())
    }
}

crate::impl_from!(XmlLayoutConfig => XmlLayout);
crate::impl_box_from!(XmlLayout => dyn LogFormatter);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ExceptionRecord;
    use crate::log::level::LogLevel;
    use chrono::{Local, TimeZone};

    fn record(message: &str) -> LogRecord {
        LogRecord::new(LogLevel::Info, message)
            .with_logger_name("app.orders")
            .with_thread_name("main")
            .with_timestamp(Local.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap())
    }

    #[test]
    fn test_element_names() {
        let names = ElementNames::with_prefix("log4net");
        assert_eq!(names.event, "log4net:event");
        assert_eq!(names.location, "log4net:locationInfo");
        assert_eq!(ElementNames::unprefixed().data, "data");
    }

    #[test]
    fn test_config_default() {
        let config = XmlLayoutConfig::default();
        assert_eq!(config.prefix, "log4net");
        assert!(!config.location_info);
        assert!(!config.base64_encode_message);
        assert!(!config.base64_encode_properties);
        assert_eq!(config.invalid_char_replacement, "?");
        assert_eq!(config.exception.max_depth, None);
    }

    #[test]
    fn test_config_from_json() {
        let config: XmlLayoutConfig = serde_json::from_str(
            r#"{"prefix": "", "location_info": true, "exception": {"max_depth": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.prefix, "");
        assert!(config.location_info);
        assert_eq!(config.exception.max_depth, Some(2));
        assert_eq!(config.invalid_char_replacement, "?");
    }

    #[test]
    fn test_format_minimal_record() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig::default());
        let record = record("hello");
        let xml = layout.format(&record)?;

        assert_eq!(
            xml,
            format!(
                r#"<log4net:event logger="app.orders" timestamp="{}" level="INFO" thread="main"><log4net:message>hello</log4net:message></log4net:event>"#,
                record.timestamp_text()
            )
        );
        Ok(())
    }

    #[test]
    fn test_format_optional_attributes() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig::default());
        let record = record("m").with_domain("shop").with_identity("").with_user_name("bob");
        let xml = layout.format(&record)?;

        assert!(xml.contains(r#"thread="main" domain="shop" username="bob">"#));
        assert!(!xml.contains("identity="));
        Ok(())
    }

    #[test]
    fn test_format_properties_in_order() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig {
            prefix: String::new(),
            ..Default::default()
        });
        let record = record("m")
            .with_property("order_id", 42)
            .with_property("note", "a<b");
        let xml = layout.format(&record)?;

        assert!(xml.contains(
            r#"<properties><data name="order_id" value="42"/><data name="note" value="a&lt;b"/></properties>"#
        ));
        Ok(())
    }

    #[test]
    fn test_attribute_values_keep_whitespace_and_quotes() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig {
            prefix: String::new(),
            ..Default::default()
        });
        let record = record("m")
            .with_user_name("o'brien")
            .with_property("sql", "select 1\nfrom dual")
            .with_property("note", "it's \"quoted\"\r\n\tend");
        let xml = layout.format(&record)?;

        assert!(xml.contains(r#"username="o'brien""#));
        assert!(xml.contains(r#"<data name="sql" value="select 1&#xA;from dual"/>"#));
        assert!(xml.contains(
            r#"<data name="note" value="it's &quot;quoted&quot;&#xD;&#xA;&#x9;end"/>"#
        ));
        assert!(!xml.contains('\n'));
        Ok(())
    }

    #[test]
    fn test_base64_properties() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig {
            prefix: String::new(),
            base64_encode_properties: true,
            ..Default::default()
        });
        let xml = layout.format(&record("m").with_property("k", "hi"))?;
        assert!(xml.contains(r#"<data name="k" value="aGk="/>"#));
        Ok(())
    }

    #[test]
    fn test_exception_rendered_as_json() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig {
            prefix: String::new(),
            ..Default::default()
        });
        let record = record("failed").with_exception(ExceptionRecord::new("IoError", "disk full"));
        let xml = layout.format(&record)?;

        assert!(xml.contains(
            r#"<exception>{ "Message" : "disk full", "ExceptionType" : "IoError""#
        ));
        assert!(xml.ends_with("</exception></event>"));
        Ok(())
    }

    #[test]
    fn test_exception_with_custom_renderers() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig {
            prefix: String::new(),
            ..Default::default()
        })
        .with_renderers(RendererMap::empty());
        let record = record("failed").with_exception(ExceptionRecord::new("IoError", "disk full"));
        let xml = layout.format(&record)?;

        assert!(xml.contains("<exception>IoError: disk full</exception>"));
        Ok(())
    }

    #[test]
    fn test_location_placeholder_when_missing() -> Result<()> {
        let layout = XmlLayout::new(XmlLayoutConfig {
            location_info: true,
            ..Default::default()
        });
        let xml = layout.format(&record("m"))?;
        assert!(xml.contains(
            r#"<log4net:locationInfo class="?" method="?" file="?" line="?"/>"#
        ));
        Ok(())
    }

    #[test]
    fn test_from_config() {
        let layout = XmlLayout::from(XmlLayoutConfig::default());
        assert_eq!(layout.config().prefix, "log4net");
        assert!(layout.renderers().get(ValueKind::Exception).is_some());
    }
}
