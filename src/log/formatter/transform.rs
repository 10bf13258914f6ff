//! XML 文本转换工具

use anyhow::Result;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Write;

const CDATA_END: &str = "]]>";
const CDATA_UNESCAPABLE_TOKEN: &str = "]]";

/// 判断字符是否允许出现在 XML 1.0 文档中
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// 将 XML 中不允许出现的字符替换为 `replacement`
pub fn mask_xml_invalid_characters<'a>(text: &'a str, replacement: &str) -> Cow<'a, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }

    let mut masked = String::with_capacity(text.len());
    for c in text.chars() {
        if is_xml_char(c) {
            masked.push(c);
        } else {
            masked.push_str(replacement);
        }
    }
    Cow::Owned(masked)
}

/// 统计不重叠出现的次数
pub fn count_substrings(text: &str, pattern: &str) -> usize {
    if pattern.is_empty() {
        return 0;
    }
    text.matches(pattern).count()
}

/// 转义双引号属性值
///
/// 换行、回车、制表符写成字符引用，避免读取端做属性值规范化时被替换成空格；
/// 单引号原样保留。
pub fn escape_attribute_value(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            '\t' => escaped.push_str("&#x9;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// 写入文本节点，按转义代价选择转义文本或 CDATA
///
/// 每个 `<`、`>` 转义代价为 3，`&` 为 4；CDATA 的代价为
/// `12 * (1 + "]]>" 出现次数)`。转义代价不超过 CDATA 时写转义文本，
/// 否则写 CDATA，其中的 `]]>` 拆开输出。
pub fn write_escaped_xml_string<W: Write>(
    writer: &mut Writer<W>,
    text: &str,
    invalid_char_replacement: &str,
) -> Result<()> {
    let data = mask_xml_invalid_characters(text, invalid_char_replacement);
    let data = data.as_ref();

    let weight_cdata = 12 * (1 + count_substrings(data, CDATA_END));
    let weight_escapes = 3 * (count_substrings(data, "<") + count_substrings(data, ">"))
        + 4 * count_substrings(data, "&");

    if weight_escapes <= weight_cdata {
        return write_text(writer, data);
    }

    let Some(mut end) = data.find(CDATA_END) else {
        return write_cdata(writer, data);
    };

    let mut start = 0;
    loop {
        write_cdata(writer, &data[start..end])?;
        if end == data.len() - CDATA_END.len() {
            start = data.len();
            write_text(writer, CDATA_END)?;
            break;
        }

        write_text(writer, CDATA_UNESCAPABLE_TOKEN)?;
        start = end + CDATA_UNESCAPABLE_TOKEN.len();
        match data[start..].find(CDATA_END) {
            Some(offset) => end = start + offset,
            None => break,
        }
    }

    if start < data.len() {
        write_cdata(writer, &data[start..])?;
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    Ok(())
}

fn write_cdata<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    writer.write_event(Event::CData(BytesCData::new(text)))?;
    Ok(())
}
