use super::{ChildEntities, ChildEntityDefinition, ChildEntityRelation};
use crate::entity_model::{EntityModel, EntityModelRegistry};
use crate::error::ModelResult;
use crate::forwarding::{EventRoutingValue, PayloadRoutingValue};
use crate::member::StructuralMember;
use crate::property::{Property, TypeInfo};
use crate::property_strategy::{PropertyAccessStrategy, default_strategies, find_property};
use bon::Builder;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 子实体定义集合（构建期配置）
///
/// - `registry`：子实体模型来源；
/// - `definitions`：启用的定义变体，按顺序尝试（默认全部三种）；
/// - `property_strategies`：路由键到属性的解析策略链（默认精确匹配 + snake_case）；
/// - `event_routing`：`RoutingKey` 模式下从事件派生路由值的钩子。
#[derive(Builder)]
pub struct ChildEntityDefinitions {
    registry: Arc<EntityModelRegistry>,
    #[builder(default = ChildEntityDefinition::ALL.to_vec())]
    definitions: Vec<ChildEntityDefinition>,
    #[builder(default = default_strategies())]
    property_strategies: Vec<Arc<dyn PropertyAccessStrategy>>,
    #[builder(default = default_event_routing())]
    event_routing: Arc<dyn EventRoutingValue>,
}

fn default_event_routing() -> Arc<dyn EventRoutingValue> {
    Arc::new(PayloadRoutingValue)
}

impl ChildEntityDefinitions {
    /// 使用默认配置
    pub fn new(registry: Arc<EntityModelRegistry>) -> Self {
        Self::builder().registry(registry).build()
    }

    pub fn registry(&self) -> &EntityModelRegistry {
        &self.registry
    }

    pub fn definitions(&self) -> &[ChildEntityDefinition] {
        &self.definitions
    }

    pub fn property_strategies(&self) -> &[Arc<dyn PropertyAccessStrategy>] {
        &self.property_strategies
    }

    pub fn event_routing(&self) -> &Arc<dyn EventRoutingValue> {
        &self.event_routing
    }

    /// 依次使用策略链在目标类型上查找属性
    pub fn find_property(&self, target: &TypeInfo, name: &str) -> Option<Property> {
        find_property(&self.property_strategies, target, name)
    }

    /// 为单个成员创建子实体关系；没有任何定义接受时返回 `Ok(None)`
    pub fn create_child<P: 'static>(
        &self,
        member: &StructuralMember<P>,
        declaring: &EntityModel,
    ) -> ModelResult<Option<ChildEntityRelation<P>>> {
        for definition in &self.definitions {
            if let Some(relation) = definition.try_create(member, declaring, self)? {
                return Ok(Some(relation));
            }
        }

        debug!(
            declaring_type = declaring.entity_type().name(),
            member = member.name(),
            kind = ?member.kind(),
            "member skipped: not a child entity member"
        );
        Ok(None)
    }

    /// 检视父实体的全部成员，构建其子实体关系集合
    ///
    /// 任一成员配置错误即整体失败。
    pub fn inspect<P: 'static>(
        &self,
        declaring: &EntityModel,
        members: impl IntoIterator<Item = StructuralMember<P>>,
    ) -> ModelResult<ChildEntities<P>> {
        let mut relations = Vec::new();
        for member in members {
            if let Some(relation) = self.create_child(&member, declaring)? {
                relations.push(relation);
            }
        }
        Ok(ChildEntities::new(relations))
    }
}

impl fmt::Debug for ChildEntityDefinitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildEntityDefinitions")
            .field("models", &self.registry.len())
            .field("definitions", &self.definitions)
            .field("property_strategies", &self.property_strategies.len())
            .finish()
    }
}
