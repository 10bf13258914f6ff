mod core;
mod json_formatter;
mod location_xml_layout;
mod registry;
mod text_formatter;
pub mod transform;
mod xml_layout;

pub use core::LogFormatter;
pub use json_formatter::{JsonFormatter, JsonFormatterConfig};
pub use location_xml_layout::LocationXmlLayout;
pub use registry::{create_formatter_from_options, register_formatters};
pub use text_formatter::{TextFormatter, TextFormatterConfig};
pub use xml_layout::{XmlLayout, XmlLayoutConfig};
