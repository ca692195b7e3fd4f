use super::ChildEntityDefinition;
use crate::entity_model::EntityModel;
use crate::forwarding::{EventForwardingFilter, EventRoutingValue, ForwardingMode};
use crate::member::{MemberId, StructuralMember};
use crate::message::{CommandMessage, EventMessage};
use crate::property::{Property, RoutingValue};
use crate::property_strategy::PropertyAccessStrategy;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// 子实体关系：父实体 `P` 的某个成员与其子实体模型的已解析绑定
///
/// 在模型构建阶段创建一次，此后只读，可在多线程间无锁共享。
/// 路由未命中以 `None`/空集合表达。
pub struct ChildEntityRelation<P> {
    pub(super) member: MemberId,
    pub(super) definition: ChildEntityDefinition,
    pub(super) source: StructuralMember<P>,
    pub(super) child_model: Arc<EntityModel>,
    pub(super) forward_commands: bool,
    pub(super) event_forwarding_mode: ForwardingMode,
    pub(super) event_routing_key: Option<String>,
    /// 命令名 -> 载荷上的路由键属性
    pub(super) routing_keys: HashMap<String, Property>,
    /// 子实体自身的路由键属性
    pub(super) identifier: Option<Property>,
    pub(super) event_routing: Arc<dyn EventRoutingValue>,
    /// 事件侧路由键解析所用的策略链（与子实体侧一致）
    pub(super) property_strategies: Vec<Arc<dyn PropertyAccessStrategy>>,
    pub(super) forwarding_filter: Option<Arc<dyn EventForwardingFilter>>,
}

impl<P> ChildEntityRelation<P> {
    pub fn member(&self) -> &MemberId {
        &self.member
    }

    pub fn definition(&self) -> ChildEntityDefinition {
        self.definition
    }

    pub fn child_model(&self) -> &Arc<EntityModel> {
        &self.child_model
    }

    pub fn forward_commands(&self) -> bool {
        self.forward_commands
    }

    /// 生效的事件转发模式
    pub fn event_forwarding_mode(&self) -> ForwardingMode {
        self.event_forwarding_mode
    }

    pub fn event_routing_key(&self) -> Option<&str> {
        self.event_routing_key.as_deref()
    }

    pub fn routing_keys(&self) -> &HashMap<String, Property> {
        &self.routing_keys
    }

    pub fn routing_key_property(&self, command_name: &str) -> Option<&Property> {
        self.routing_keys.get(command_name)
    }

    /// 子实体模型是否处理该命令
    pub fn handles(&self, command_name: &str) -> bool {
        self.child_model.handles(command_name)
    }

    /// 解析命令应路由到的子实体
    ///
    /// - 单引用：直接返回当前引用（与命令内容无关）；
    /// - 集合/映射：按命令名取路由键属性，读取载荷上的路由值，
    ///   返回第一个路由键取值相等的子实体。
    pub fn resolve_command_target<'a>(
        &self,
        command: &CommandMessage,
        parent: &'a P,
    ) -> Option<&'a dyn Any> {
        let mut children = self.source.children(parent);

        match self.definition {
            ChildEntityDefinition::Single => children.next(),
            ChildEntityDefinition::Sequence | ChildEntityDefinition::Keyed => {
                let Some(property) = self.routing_keys.get(command.command_name()) else {
                    trace!(
                        member = %self.member,
                        command = command.command_name(),
                        "command not handled by child entity"
                    );
                    return None;
                };
                let routing_value = property.value(command.payload())?;

                let target = children.find(|child| self.matches(*child, &routing_value));
                if target.is_none() {
                    trace!(
                        member = %self.member,
                        command = command.command_name(),
                        routing_value = %routing_value,
                        "no child entity matches routing value"
                    );
                }
                target
            }
        }
    }

    /// 候选事件接收者：`None` 模式为空，否则为成员当前持有的全部子实体
    pub fn resolve_event_targets<'a>(&self, parent: &'a P) -> Vec<&'a dyn Any> {
        if self.event_forwarding_mode == ForwardingMode::None {
            return Vec::new();
        }
        self.source.children(parent).collect()
    }

    /// 按转发模式筛选事件接收者
    ///
    /// `RoutingKey` 模式：以 `event_routing_key`（缺省为子实体路由键）从事件派生取值，
    /// 与每个子实体自身的路由键属性做相等比较。
    pub fn forward_event<'a>(&self, event: &EventMessage, parent: &'a P) -> Vec<&'a dyn Any> {
        let candidates = self.resolve_event_targets(parent);
        if candidates.is_empty() {
            return candidates;
        }

        match self.event_forwarding_mode {
            ForwardingMode::None | ForwardingMode::All => candidates,
            ForwardingMode::RoutingKey => {
                let Some(identifier) = &self.identifier else {
                    return Vec::new();
                };
                let key = self.event_key();
                let Some(value) =
                    self.event_routing
                        .routing_value(event, key, &self.property_strategies)
                else {
                    trace!(
                        member = %self.member,
                        event = event.event_type(),
                        routing_key = key,
                        "event carries no routing value"
                    );
                    return Vec::new();
                };
                candidates
                    .into_iter()
                    .filter(|child| identifier.value(*child).as_ref() == Some(&value))
                    .collect()
            }
            ForwardingMode::Custom => match &self.forwarding_filter {
                Some(filter) => filter.filter(event, candidates),
                None => Vec::new(),
            },
        }
    }

    // 事件侧读取的属性名
    fn event_key(&self) -> &str {
        self.event_routing_key
            .as_deref()
            .unwrap_or(self.child_model.routing_key())
    }

    fn matches(&self, child: &dyn Any, routing_value: &RoutingValue) -> bool {
        self.identifier
            .as_ref()
            .and_then(|identifier| identifier.value(child))
            .is_some_and(|value| &value == routing_value)
    }
}

impl<P> fmt::Debug for ChildEntityRelation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildEntityRelation")
            .field("member", &self.member.to_string())
            .field("definition", &self.definition)
            .field("child_type", &self.child_model.entity_type().name())
            .field("forward_commands", &self.forward_commands)
            .field("event_forwarding_mode", &self.event_forwarding_mode)
            .field("event_routing_key", &self.event_routing_key)
            .finish()
    }
}
