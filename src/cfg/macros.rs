//! 组件构造相关的宏
//!
//! 注册表要求 `T: From<Config>` 且 `Box<T>: Into<Box<dyn Trait>>`，
//! 这两个宏负责生成这部分样板代码。

/// 为配置类型实现 `From<Config> for T`
///
/// - `impl_from!(Config => T)`：调用 `T::new(config)`
/// - `impl_from!(Config => T, field: config)`：直接构造 `Self { config }`
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };

    ($config_type:ty => $target_type:ty, field: $field:ident) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                Self { $field: config }
            }
        }
    };
}

/// 实现 `Box<T>` 到 `Box<dyn Trait>` 的转换
///
/// 用法：`impl_box_from!(XmlLayout => dyn LogFormatter)`
#[macro_export]
macro_rules! impl_box_from {
    ($source_type:ty => dyn $trait_name:path) => {
        impl From<Box<$source_type>> for Box<dyn $trait_name> {
            fn from(source: Box<$source_type>) -> Self {
                source as Box<dyn $trait_name>
            }
        }
    };
}

#[cfg(test)]
mod tests {
    trait Shape: Send + Sync {
        fn sides(&self) -> usize;
    }

    #[derive(Debug, Clone)]
    struct PolygonConfig {
        sides: usize,
    }

    struct Polygon {
        config: PolygonConfig,
    }

    impl Shape for Polygon {
        fn sides(&self) -> usize {
            self.config.sides
        }
    }

    struct Square {
        sides: usize,
    }

    impl Square {
        fn new(_: PolygonConfig) -> Self {
            Self { sides: 4 }
        }
    }

    impl_from!(PolygonConfig => Polygon, field: config);
    impl_from!(PolygonConfig => Square);
    impl_box_from!(Polygon => dyn Shape);

    #[test]
    fn test_impl_from_field() {
        let polygon = Polygon::from(PolygonConfig { sides: 6 });
        assert_eq!(polygon.config.sides, 6);
    }

    #[test]
    fn test_impl_from_new() {
        let square = Square::from(PolygonConfig { sides: 9 });
        assert_eq!(square.sides, 4);
    }

    #[test]
    fn test_impl_box_from() {
        let shape: Box<dyn Shape> = Box::new(Polygon::from(PolygonConfig { sides: 3 })).into();
        assert_eq!(shape.sides(), 3);
    }
}
