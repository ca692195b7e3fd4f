//! 模型构建统一错误定义
//!
//! 仅覆盖实体模型与子实体关系构建阶段的配置错误；
//! 路由阶段“未命中”属于正常结果，以 `None`/空集合表达，不在此列。
//!
use thiserror::Error;

/// 统一错误类型（模型构建期）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    // --- 路由键 ---
    #[error(
        "command of type [{payload_type}] doesn't have a property matching the routing key [{routing_key}] necessary to route through member [{member}]"
    )]
    MissingRoutingProperty {
        payload_type: String,
        routing_key: String,
        member: String,
    },
    #[error(
        "entity of type [{entity_type}] doesn't have a property matching the routing key [{routing_key}] necessary to route through member [{member}]"
    )]
    MissingIdentifierProperty {
        entity_type: String,
        routing_key: String,
        member: String,
    },
    #[error("duplicate command handler: command={command}, entity={entity_type}")]
    DuplicateCommandHandler {
        command: String,
        entity_type: String,
    },

    // --- 模型注册 ---
    #[error("entity model not found: type={entity_type}, member={member}")]
    ModelNotFound { entity_type: String, member: String },
    #[error("duplicate entity model: type={entity_type}")]
    DuplicateModel { entity_type: String },

    // --- 成员元数据 ---
    #[error("custom event forwarding requires a filter: member={member}")]
    MissingForwardingFilter { member: String },
    #[error("invalid member metadata: {reason}")]
    InvalidMetadata { reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

impl ModelError {
    /// 是否为可定位到具体成员的配置错误
    pub fn member(&self) -> Option<&str> {
        match self {
            ModelError::MissingRoutingProperty { member, .. }
            | ModelError::MissingIdentifierProperty { member, .. }
            | ModelError::ModelNotFound { member, .. }
            | ModelError::MissingForwardingFilter { member } => Some(member),
            _ => None,
        }
    }
}

/// 统一 Result 类型别名
pub type ModelResult<T> = Result<T, ModelError>;
