use super::ChildEntityRelation;
use crate::message::{CommandMessage, EventMessage};
use std::any::Any;
use std::fmt;

/// 命令路由结果：命中的关系与子实体
pub struct CommandTarget<'a, P> {
    relation: &'a ChildEntityRelation<P>,
    entity: &'a dyn Any,
}

impl<'a, P> CommandTarget<'a, P> {
    pub fn relation(&self) -> &'a ChildEntityRelation<P> {
        self.relation
    }

    pub fn entity(&self) -> &'a dyn Any {
        self.entity
    }

    pub fn downcast<C: Any>(&self) -> Option<&'a C> {
        self.entity.downcast_ref::<C>()
    }
}

impl<P> fmt::Debug for CommandTarget<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTarget")
            .field("member", &self.relation.member().to_string())
            .finish()
    }
}

/// 父实体 `P` 的全部子实体关系（父实体分发逻辑的入口）
pub struct ChildEntities<P> {
    relations: Vec<ChildEntityRelation<P>>,
}

impl<P> ChildEntities<P> {
    pub fn new(relations: Vec<ChildEntityRelation<P>>) -> Self {
        Self { relations }
    }

    pub fn relations(&self) -> &[ChildEntityRelation<P>] {
        &self.relations
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// 命令路由：第一个开启命令转发、处理该命令且解析出目标的关系
    pub fn route_command<'a>(
        &'a self,
        command: &CommandMessage,
        parent: &'a P,
    ) -> Option<CommandTarget<'a, P>> {
        self.relations
            .iter()
            .filter(|relation| relation.forward_commands() && relation.handles(command.command_name()))
            .find_map(|relation| {
                relation
                    .resolve_command_target(command, parent)
                    .map(|entity| CommandTarget { relation, entity })
            })
    }

    /// 事件路由：各关系按自身转发模式筛选后的接收者（按成员声明顺序拼接）
    pub fn route_event<'a>(&self, event: &EventMessage, parent: &'a P) -> Vec<&'a dyn Any> {
        self.relations
            .iter()
            .flat_map(|relation| relation.forward_event(event, parent))
            .collect()
    }
}

impl<P> fmt::Debug for ChildEntities<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.relations.iter()).finish()
    }
}
