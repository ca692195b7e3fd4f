//! 属性访问策略（PropertyAccessStrategy）
//!
//! 将“路由键名称”解析为目标类型上的具体属性。多个策略按顺序尝试，
//! 先命中者生效。
//!
use crate::property::{Property, TypeInfo};
use std::sync::Arc;

/// 属性访问策略
pub trait PropertyAccessStrategy: Send + Sync {
    /// 在目标类型上查找名为 `name` 的属性
    fn get_property(&self, target: &TypeInfo, name: &str) -> Option<Property>;
}

/// 按声明名称精确匹配
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPropertyAccess;

impl PropertyAccessStrategy for DirectPropertyAccess {
    fn get_property(&self, target: &TypeInfo, name: &str) -> Option<Property> {
        target.property(name)
    }
}

/// 将驼峰命名的路由键（如 `orderId`）转换为 snake_case 后匹配
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCasePropertyAccess;

impl PropertyAccessStrategy for SnakeCasePropertyAccess {
    fn get_property(&self, target: &TypeInfo, name: &str) -> Option<Property> {
        let snake = to_snake_case(name);
        if snake == name {
            return None;
        }
        target.property(&snake)
    }
}

/// 默认策略链：精确匹配优先，其次 snake_case
pub fn default_strategies() -> Vec<Arc<dyn PropertyAccessStrategy>> {
    vec![Arc::new(DirectPropertyAccess), Arc::new(SnakeCasePropertyAccess)]
}

/// 依次尝试策略链
pub fn find_property(
    strategies: &[Arc<dyn PropertyAccessStrategy>],
    target: &TypeInfo,
    name: &str,
) -> Option<Property> {
    strategies
        .iter()
        .find_map(|strategy| strategy.get_property(target, name))
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyAccess, RoutingValue, ToRoutingValue};

    struct Shipment {
        order_id: String,
    }

    impl PropertyAccess for Shipment {
        const PROPERTY_NAMES: &'static [&'static str] = &["order_id"];

        fn property(name: &str) -> Option<Property> {
            match name {
                "order_id" => Some(Property::of::<Self>("order_id", |s: &Self| {
                    s.order_id.to_routing_value()
                })),
                _ => None,
            }
        }
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("orderId"), "order_id");
        assert_eq!(to_snake_case("lineItem2Id"), "line_item2_id");
        assert_eq!(to_snake_case("id"), "id");
        assert_eq!(to_snake_case("HTTPCode"), "httpcode");
    }

    #[test]
    fn direct_only_matches_declared_name() {
        let info = TypeInfo::of::<Shipment>();
        assert!(DirectPropertyAccess.get_property(&info, "order_id").is_some());
        assert!(DirectPropertyAccess.get_property(&info, "orderId").is_none());
    }

    #[test]
    fn chain_falls_back_to_snake_case() {
        let info = TypeInfo::of::<Shipment>();
        let strategies = default_strategies();
        let prop = find_property(&strategies, &info, "orderId").unwrap();
        assert_eq!(prop.name(), "order_id");
        let shipment = Shipment {
            order_id: "o-1".into(),
        };
        assert_eq!(prop.value(&shipment), Some(RoutingValue::Text("o-1".into())));
        assert!(find_property(&strategies, &info, "customerId").is_none());
    }
}
