use serde_json::Value;

/// 按固定顺序拼接 JSON 对象文本
///
/// 输出格式为 `{ "A" : 1, "B" : 2}`：首个字段前有一个空格，字段之间以
/// `, ` 分隔，名字与值之间为 ` : `。字段名不做转义，值由调用方负责。
pub(crate) struct JsonObjectWriter {
    buf: String,
    empty: bool,
}

impl JsonObjectWriter {
    pub(crate) fn new() -> Self {
        Self::with_capacity(256)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut buf = String::with_capacity(capacity);
        buf.push('{');
        Self { buf, empty: true }
    }

    /// 写入已经是 JSON 文本的值
    pub(crate) fn raw_field(&mut self, name: &str, value: &str) -> &mut Self {
        self.buf.push_str(if self.empty { " " } else { ", " });
        self.empty = false;
        self.buf.push('"');
        self.buf.push_str(name);
        self.buf.push_str("\" : ");
        self.buf.push_str(value);
        self
    }

    /// 写入字符串值，按 JSON 规则转义
    pub(crate) fn string_field(&mut self, name: &str, value: &str) -> &mut Self {
        let quoted = quote(value);
        self.raw_field(name, &quoted)
    }

    pub(crate) fn finish(mut self) -> String {
        self.buf.push('}');
        self.buf
    }
}

/// JSON 字符串字面量
pub(crate) fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// 紧凑格式的 JSON 数组
pub(crate) fn array<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buf = String::from("[");
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push_str(item.as_ref());
    }
    buf.push(']');
    buf
}

/// 按插入顺序输出的紧凑 JSON 对象
pub(crate) fn ordered_object(entries: &[(String, Value)]) -> String {
    let mut buf = String::from("{");
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push_str(&quote(key));
        buf.push(':');
        buf.push_str(&value.to_string());
    }
    buf.push('}');
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_writer() {
        let mut writer = JsonObjectWriter::new();
        writer.string_field("Message", "say \"hi\"").raw_field("Count", "3");
        assert_eq!(writer.finish(), r#"{ "Message" : "say \"hi\"", "Count" : 3}"#);
    }

    #[test]
    fn test_empty_object_writer() {
        assert_eq!(JsonObjectWriter::new().finish(), "{}");
    }

    #[test]
    fn test_array() {
        assert_eq!(array(Vec::<String>::new()), "[]");
        assert_eq!(array(["1", "{}", "null"]), "[1,{},null]");
    }

    #[test]
    fn test_ordered_object_keeps_insertion_order() {
        let entries = vec![
            ("zeta".to_string(), json!(1)),
            ("alpha".to_string(), json!({"x": [true]})),
        ];
        assert_eq!(ordered_object(&entries), r#"{"zeta":1,"alpha":{"x":[true]}}"#);
        assert_eq!(ordered_object(&[]), "{}");
    }
}
