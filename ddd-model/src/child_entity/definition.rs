use super::{ChildEntityDefinitions, ChildEntityRelation};
use crate::entity_model::{CommandHandlingMember, EntityModel};
use crate::error::{ModelError, ModelResult};
use crate::forwarding::ForwardingMode;
use crate::member::{MemberId, MemberKind, StructuralMember};
use crate::property::Property;
use crate::property_strategy::{PropertyAccessStrategy, find_property};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;

/// 子实体定义：按成员形态区分的封闭变体集合
///
/// - `Single`：单个子实体引用；
/// - `Sequence`：有序集合，子实体模型为元素类型；
/// - `Keyed`：键值映射，子实体模型为值类型。
///
/// 三个变体对同一成员互斥：至多一个变体接受该成员，普通值字段不被任何变体接受。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildEntityDefinition {
    Single,
    Sequence,
    Keyed,
}

impl ChildEntityDefinition {
    pub const ALL: [ChildEntityDefinition; 3] = [
        ChildEntityDefinition::Single,
        ChildEntityDefinition::Sequence,
        ChildEntityDefinition::Keyed,
    ];

    /// 成员的静态形态是否为该变体所支持
    pub fn supports<P>(&self, member: &StructuralMember<P>) -> bool {
        matches!(
            (self, member.kind()),
            (ChildEntityDefinition::Single, MemberKind::Single)
                | (ChildEntityDefinition::Sequence, MemberKind::Sequence)
                | (ChildEntityDefinition::Keyed, MemberKind::Keyed)
        )
    }

    /// 提取子实体模型
    pub fn extract_child_model<P>(
        &self,
        context: &ChildEntityDefinitions,
        member_id: &MemberId,
        member: &StructuralMember<P>,
    ) -> ModelResult<Arc<EntityModel>> {
        // 单引用取成员自身类型；集合/映射取元素类型，而非容器类型
        let Some(child_type) = member.child_type() else {
            return Err(ModelError::InvalidMetadata {
                reason: format!(
                    "member {member_id} of type [{}] is not a child entity member",
                    member.declared_type()
                ),
            });
        };

        context
            .registry()
            .model_of(child_type)
            .ok_or_else(|| ModelError::ModelNotFound {
                entity_type: child_type.name().to_string(),
                member: member_id.to_string(),
            })
    }

    /// 尝试为成员构建子实体关系
    ///
    /// - 成员未声明子实体元数据，或形态不受该变体支持：返回 `Ok(None)`；
    /// - 路由键无法解析等配置问题在此处立即失败，而非首次路由时。
    pub fn try_create<P: 'static>(
        &self,
        member: &StructuralMember<P>,
        declaring: &EntityModel,
        context: &ChildEntityDefinitions,
    ) -> ModelResult<Option<ChildEntityRelation<P>>> {
        let Some(metadata) = member.metadata() else {
            return Ok(None);
        };
        if !self.supports(member) {
            return Ok(None);
        }

        let member_id = MemberId::new(declaring.entity_type().name(), member.name());
        let child_model = self.extract_child_model(context, &member_id, member)?;

        let event_forwarding_mode = ForwardingMode::effective(
            metadata.forward_events(),
            metadata.event_forwarding_mode(),
        );

        let routing_keys = extract_command_handler_routing_keys(
            &member_id,
            &child_model,
            context.property_strategies(),
        )?;

        // 集合/映射按标识匹配命令；RoutingKey 模式按标识匹配事件
        let identifier = context.find_property(child_model.entity_type(), child_model.routing_key());
        let identifier_required = *self != ChildEntityDefinition::Single
            || event_forwarding_mode == ForwardingMode::RoutingKey;
        if identifier.is_none() && identifier_required {
            return Err(missing_identifier(&member_id, &child_model, child_model.routing_key()));
        }

        let forwarding_filter = match event_forwarding_mode {
            ForwardingMode::Custom => Some(metadata.forwarding_filter().cloned().ok_or_else(
                || ModelError::MissingForwardingFilter {
                    member: member_id.to_string(),
                },
            )?),
            _ => None,
        };

        debug!(
            member = %member_id,
            definition = ?self,
            child_type = child_model.entity_type().name(),
            forward_commands = metadata.forward_commands(),
            event_forwarding_mode = ?event_forwarding_mode,
            routed_commands = routing_keys.len(),
            "child entity relation created"
        );

        Ok(Some(ChildEntityRelation {
            member: member_id,
            definition: *self,
            source: member.clone(),
            child_model,
            forward_commands: metadata.forward_commands(),
            event_forwarding_mode,
            event_routing_key: metadata.event_routing_key().map(str::to_string),
            routing_keys,
            identifier,
            event_routing: context.event_routing().clone(),
            property_strategies: context.property_strategies().to_vec(),
            forwarding_filter,
        }))
    }
}

/// 提取子实体模型上每个命令处理器的路由键属性
///
/// 路由键：处理器显式声明优先，否则取子实体模型的默认路由键。
/// 任一载荷类型缺少对应属性即返回配置错误；命令名重复同样视为配置错误。
pub fn extract_command_handler_routing_keys(
    member_id: &MemberId,
    child_model: &EntityModel,
    strategies: &[Arc<dyn PropertyAccessStrategy>],
) -> ModelResult<HashMap<String, Property>> {
    let mut routing_keys = HashMap::with_capacity(child_model.command_handlers().len());

    for handler in child_model.command_handlers() {
        let property = extract_command_handler_routing_key(member_id, child_model, handler, strategies)?;
        match routing_keys.entry(handler.command_name().to_string()) {
            Entry::Occupied(_) => {
                return Err(ModelError::DuplicateCommandHandler {
                    command: handler.command_name().to_string(),
                    entity_type: child_model.entity_type().name().to_string(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(property);
            }
        }
    }

    Ok(routing_keys)
}

fn extract_command_handler_routing_key(
    member_id: &MemberId,
    child_model: &EntityModel,
    handler: &CommandHandlingMember,
    strategies: &[Arc<dyn PropertyAccessStrategy>],
) -> ModelResult<Property> {
    let routing_key = handler.routing_key().unwrap_or(child_model.routing_key());

    find_property(strategies, handler.payload_type(), routing_key).ok_or_else(|| {
        ModelError::MissingRoutingProperty {
            payload_type: handler.payload_type().name().to_string(),
            routing_key: routing_key.to_string(),
            member: member_id.to_string(),
        }
    })
}

fn missing_identifier(member_id: &MemberId, child_model: &EntityModel, key: &str) -> ModelError {
    ModelError::MissingIdentifierProperty {
        entity_type: child_model.entity_type().name().to_string(),
        routing_key: key.to_string(),
        member: member_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_model::EntityModelRegistry;
    use crate::member::MemberMetadata;
    use crate::property::{PropertyAccess, RoutingValue, ToRoutingValue, TypeInfo};
    use crate::property_strategy::default_strategies;

    struct Stop {
        stop_id: u32,
    }

    impl PropertyAccess for Stop {
        const PROPERTY_NAMES: &'static [&'static str] = &["stop_id"];

        fn property(name: &str) -> Option<Property> {
            (name == "stop_id")
                .then(|| Property::of::<Self>("stop_id", |s: &Self| s.stop_id.to_routing_value()))
        }
    }

    struct SkipStop {
        stop_id: u32,
        reason: String,
    }

    impl PropertyAccess for SkipStop {
        const PROPERTY_NAMES: &'static [&'static str] = &["stop_id", "reason"];

        fn property(name: &str) -> Option<Property> {
            match name {
                "stop_id" => Some(Property::of::<Self>("stop_id", |s: &Self| {
                    s.stop_id.to_routing_value()
                })),
                "reason" => Some(Property::of::<Self>("reason", |s: &Self| {
                    s.reason.to_routing_value()
                })),
                _ => None,
            }
        }
    }

    struct Route {
        stops: Vec<Stop>,
    }

    impl PropertyAccess for Route {
        const PROPERTY_NAMES: &'static [&'static str] = &[];

        fn property(_name: &str) -> Option<Property> {
            None
        }
    }

    fn stops(route: &Route) -> &[Stop] {
        &route.stops
    }

    fn first_stop(route: &Route) -> Option<&Stop> {
        route.stops.first()
    }

    fn handler(name: &str) -> CommandHandlingMember {
        CommandHandlingMember::builder()
            .command_name(name)
            .payload_type(TypeInfo::of::<SkipStop>())
            .build()
    }

    fn route_model() -> EntityModel {
        EntityModel::builder()
            .entity_type(TypeInfo::of::<Route>())
            .routing_key("route_id")
            .build()
    }

    fn context(handlers: Vec<CommandHandlingMember>) -> ChildEntityDefinitions {
        let mut registry = EntityModelRegistry::new();
        registry
            .register(
                EntityModel::builder()
                    .entity_type(TypeInfo::of::<Stop>())
                    .routing_key("stop_id")
                    .command_handlers(handlers)
                    .build(),
            )
            .unwrap();
        ChildEntityDefinitions::new(Arc::new(registry))
    }

    #[test]
    fn supports_matches_member_kind_only() {
        let seq = StructuralMember::sequence("stops", stops);
        assert!(!ChildEntityDefinition::Single.supports(&seq));
        assert!(ChildEntityDefinition::Sequence.supports(&seq));
        assert!(!ChildEntityDefinition::Keyed.supports(&seq));

        let plain = StructuralMember::<Route>::value::<String>("name");
        assert!(ChildEntityDefinition::ALL.iter().all(|d| !d.supports(&plain)));
    }

    #[test]
    fn routing_keys_use_default_key() {
        let ctx = context(vec![handler("stop.skip")]);
        let child = ctx.registry().model_of(&TypeInfo::of::<Stop>()).unwrap();
        let keys = extract_command_handler_routing_keys(
            &MemberId::new("Route", "stops"),
            &child,
            &default_strategies(),
        )
        .unwrap();

        assert_eq!(keys.len(), 1);
        let property = &keys["stop.skip"];
        assert_eq!(property.name(), "stop_id");
        let payload = SkipStop {
            stop_id: 4,
            reason: "closed".into(),
        };
        assert_eq!(property.value(&payload), Some(RoutingValue::Integer(4)));
    }

    #[test]
    fn explicit_routing_key_wins() {
        let ctx = context(vec![handler("stop.skip").with_routing_key("reason")]);
        let child = ctx.registry().model_of(&TypeInfo::of::<Stop>()).unwrap();
        let keys = extract_command_handler_routing_keys(
            &MemberId::new("Route", "stops"),
            &child,
            ctx.property_strategies(),
        )
        .unwrap();
        assert_eq!(keys["stop.skip"].name(), "reason");
    }

    #[test]
    fn duplicate_command_names_fail() {
        let ctx = context(vec![handler("stop.skip"), handler("stop.skip")]);
        let member = StructuralMember::sequence("stops", stops).with_metadata(MemberMetadata::default());
        let err = ChildEntityDefinition::Sequence
            .try_create(&member, &route_model(), &ctx)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateCommandHandler { .. }));
    }

    #[test]
    fn member_without_metadata_is_skipped() {
        let ctx = context(vec![handler("stop.skip")]);
        let member = StructuralMember::sequence("stops", stops);
        for definition in ChildEntityDefinition::ALL {
            assert!(definition.try_create(&member, &route_model(), &ctx).unwrap().is_none());
        }
    }

    #[test]
    fn unsupported_kind_is_skipped_by_that_definition() {
        let ctx = context(vec![handler("stop.skip")]);
        let member = StructuralMember::sequence("stops", stops).with_metadata(MemberMetadata::default());
        assert!(ChildEntityDefinition::Single
            .try_create(&member, &route_model(), &ctx)
            .unwrap()
            .is_none());
        assert!(ChildEntityDefinition::Keyed
            .try_create(&member, &route_model(), &ctx)
            .unwrap()
            .is_none());
        let relation = ChildEntityDefinition::Sequence
            .try_create(&member, &route_model(), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(relation.definition(), ChildEntityDefinition::Sequence);
        assert!(relation.member().to_string().ends_with("Route.stops"));
    }

    #[test]
    fn missing_child_model_fails() {
        let ctx = ChildEntityDefinitions::new(Arc::new(EntityModelRegistry::new()));
        let member = StructuralMember::sequence("stops", stops).with_metadata(MemberMetadata::default());
        let err = ChildEntityDefinition::Sequence
            .try_create(&member, &route_model(), &ctx)
            .unwrap_err();
        assert!(matches!(err, ModelError::ModelNotFound { .. }));
    }

    #[test]
    fn custom_mode_requires_filter_only_when_forwarding() {
        let ctx = context(vec![handler("stop.skip")]);
        let custom = MemberMetadata::builder()
            .event_forwarding_mode(ForwardingMode::Custom)
            .build();
        let member = StructuralMember::sequence("stops", stops).with_metadata(custom);
        let err = ChildEntityDefinition::Sequence
            .try_create(&member, &route_model(), &ctx)
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingForwardingFilter { .. }));

        let silenced = MemberMetadata::builder()
            .forward_events(false)
            .event_forwarding_mode(ForwardingMode::Custom)
            .build();
        let member = StructuralMember::sequence("stops", stops).with_metadata(silenced);
        let relation = ChildEntityDefinition::Sequence
            .try_create(&member, &route_model(), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(relation.event_forwarding_mode(), ForwardingMode::None);
    }

    #[test]
    fn routing_key_mode_compares_against_child_identifier() {
        let ctx = context(vec![handler("stop.skip")]);
        let metadata = MemberMetadata::builder()
            .event_forwarding_mode(ForwardingMode::RoutingKey)
            .event_routing_key("platform")
            .build();
        let member = StructuralMember::sequence("stops", stops).with_metadata(metadata);
        let relation = ChildEntityDefinition::Sequence
            .try_create(&member, &route_model(), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(relation.event_forwarding_mode(), ForwardingMode::RoutingKey);
        assert_eq!(relation.event_routing_key(), Some("platform"));
    }

    #[test]
    fn routing_key_mode_requires_identifier_on_single_member() {
        let mut registry = EntityModelRegistry::new();
        registry
            .register(
                EntityModel::builder()
                    .entity_type(TypeInfo::of::<Stop>())
                    .routing_key("platform")
                    .build(),
            )
            .unwrap();
        let ctx = ChildEntityDefinitions::new(Arc::new(registry));

        let plain = StructuralMember::single("first_stop", first_stop)
            .with_metadata(MemberMetadata::default());
        assert!(ChildEntityDefinition::Single
            .try_create(&plain, &route_model(), &ctx)
            .unwrap()
            .is_some());

        let routed = StructuralMember::single("first_stop", first_stop).with_metadata(
            MemberMetadata::builder()
                .event_forwarding_mode(ForwardingMode::RoutingKey)
                .build(),
        );
        let err = ChildEntityDefinition::Single
            .try_create(&routed, &route_model(), &ctx)
            .unwrap_err();
        match err {
            ModelError::MissingIdentifierProperty { routing_key, .. } => {
                assert_eq!(routing_key, "platform")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn value_member_has_no_child_model() {
        let ctx = context(vec![handler("stop.skip")]);
        let plain = StructuralMember::<Route>::value::<String>("name");
        let err = ChildEntityDefinition::Single
            .extract_child_model(&ctx, &MemberId::new("Route", "name"), &plain)
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidMetadata { .. }));
    }
}
