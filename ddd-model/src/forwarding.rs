//! 事件转发策略（ForwardingMode）
//!
//! 决定事件被转发给子实体中的哪些实例：
//! - `None`：不转发；
//! - `All`：转发给全部子实体；
//! - `RoutingKey`：仅转发给路由键取值与事件一致的子实体；
//! - `Custom`：交由成员上声明的自定义过滤器决定。
//!
use crate::message::EventMessage;
use crate::property::RoutingValue;
use crate::property_strategy::{PropertyAccessStrategy, find_property};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// 事件转发模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForwardingMode {
    None,
    #[default]
    All,
    RoutingKey,
    Custom,
}

impl ForwardingMode {
    pub const ALL_MODES: [ForwardingMode; 4] = [
        ForwardingMode::None,
        ForwardingMode::All,
        ForwardingMode::RoutingKey,
        ForwardingMode::Custom,
    ];

    /// 生效的转发模式：未开启事件转发时一律为 `None`，否则沿用声明值
    pub const fn effective(forward_events: bool, declared: ForwardingMode) -> ForwardingMode {
        if forward_events {
            declared
        } else {
            ForwardingMode::None
        }
    }
}

/// 从事件中派生路由取值（`RoutingKey` 模式使用）
///
/// 派生结果会与每个子实体的路由键属性逐一做相等比较。
/// `strategies` 为构建期配置的属性解析策略链，子实体侧使用同一条链。
pub trait EventRoutingValue: Send + Sync {
    fn routing_value(
        &self,
        event: &EventMessage,
        routing_key: &str,
        strategies: &[Arc<dyn PropertyAccessStrategy>],
    ) -> Option<RoutingValue>;
}

/// 默认实现：经策略链读取事件载荷上的对应属性
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadRoutingValue;

impl EventRoutingValue for PayloadRoutingValue {
    fn routing_value(
        &self,
        event: &EventMessage,
        routing_key: &str,
        strategies: &[Arc<dyn PropertyAccessStrategy>],
    ) -> Option<RoutingValue> {
        find_property(strategies, event.payload_type(), routing_key)
            .and_then(|property| property.value(event.payload()))
    }
}

/// 自定义转发过滤器（`Custom` 模式使用）
pub trait EventForwardingFilter: Send + Sync {
    fn filter<'a>(&self, event: &EventMessage, candidates: Vec<&'a dyn Any>) -> Vec<&'a dyn Any>;
}
