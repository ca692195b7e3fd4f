//! 实体模型（EntityModel）
//!
//! 描述某个实体类型的消息处理能力：
//! - 已注册的命令处理器（命令名、载荷类型、可选的显式路由键）；
//! - 实体自身的默认路由键（用于将命令/事件关联到具体实例）。
//!
//! 模型在启动阶段构建并登记到 `EntityModelRegistry`，此后只读共享。
//!
use crate::error::{ModelError, ModelResult};
use crate::message::Command;
use crate::property::TypeInfo;
use bon::Builder;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// 命令处理器描述
#[derive(Builder, Debug, Clone)]
pub struct CommandHandlingMember {
    /// 命令名（同一模型内唯一）
    #[builder(into)]
    command_name: String,
    /// 命令载荷类型
    payload_type: TypeInfo,
    /// 显式路由键（缺省时使用实体默认路由键）
    #[builder(into)]
    routing_key: Option<String>,
}

impl CommandHandlingMember {
    /// 以命令类型的 `NAME` 与载荷类型构造
    pub fn of<C: Command>() -> Self {
        Self {
            command_name: C::NAME.to_string(),
            payload_type: TypeInfo::of::<C>(),
            routing_key: None,
        }
    }

    pub fn with_routing_key(mut self, routing_key: impl Into<String>) -> Self {
        self.routing_key = Some(routing_key.into());
        self
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn payload_type(&self) -> &TypeInfo {
        &self.payload_type
    }

    pub fn routing_key(&self) -> Option<&str> {
        self.routing_key.as_deref()
    }
}

/// 实体模型
#[derive(Builder, Debug, Clone)]
pub struct EntityModel {
    entity_type: TypeInfo,
    /// 默认路由键
    #[builder(into)]
    routing_key: String,
    #[builder(default)]
    command_handlers: Vec<CommandHandlingMember>,
}

impl EntityModel {
    pub fn entity_type(&self) -> &TypeInfo {
        &self.entity_type
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn command_handlers(&self) -> &[CommandHandlingMember] {
        &self.command_handlers
    }

    pub fn command_handler(&self, command_name: &str) -> Option<&CommandHandlingMember> {
        self.command_handlers
            .iter()
            .find(|h| h.command_name() == command_name)
    }

    pub fn handles(&self, command_name: &str) -> bool {
        self.command_handler(command_name).is_some()
    }
}

/// 实体模型登记表
///
/// 启动阶段单线程写入，之后以 `Arc` 共享只读。
#[derive(Debug, Default)]
pub struct EntityModelRegistry {
    models: HashMap<TypeId, Arc<EntityModel>>,
}

impl EntityModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记模型；同一类型重复登记视为配置错误
    pub fn register(&mut self, model: EntityModel) -> ModelResult<Arc<EntityModel>> {
        let type_id = model.entity_type().type_id();
        if self.models.contains_key(&type_id) {
            return Err(ModelError::DuplicateModel {
                entity_type: model.entity_type().name().to_string(),
            });
        }

        let model = Arc::new(model);
        self.models.insert(type_id, model.clone());
        Ok(model)
    }

    pub fn model_of(&self, entity_type: &TypeInfo) -> Option<Arc<EntityModel>> {
        self.models.get(&entity_type.type_id()).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
