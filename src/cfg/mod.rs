//! cfg 模块 - 组件配置
//!
//! 通过 `TypeOptions { type, options }` 描述组件，再由 trait 注册表按名称构造
//! formatter、appender 等实现；同时提供按扩展名加载配置文件的能力。

pub mod loader;
pub mod macros;
pub mod registry;
pub mod type_options;

pub use loader::{load_config_file, parse_config_str, ConfigFormat};
pub use registry::{create_trait_from_type_options, register_trait};
pub use type_options::TypeOptions;
