//! 消息（Message）
//!
//! 路由所需的最小消息形态：命令/事件名称 + 类型擦除的载荷。
//! 传输、序列化与总线不在本 crate 关注范围内。
//!
use crate::property::{PropertyAccess, TypeInfo};
use std::any::Any;
use std::fmt;

/// 命令载荷
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于路由与日志。避免依赖 `type_name::<T>()`。
pub trait Command: PropertyAccess {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}

/// 命令消息
pub struct CommandMessage {
    command_name: String,
    payload_type: TypeInfo,
    payload: Box<dyn Any + Send + Sync>,
}

impl CommandMessage {
    pub fn new<C: Command>(command: C) -> Self {
        Self::named(C::NAME, command)
    }

    /// 使用自定义名称封装任意载荷
    pub fn named<T: PropertyAccess>(command_name: impl Into<String>, payload: T) -> Self {
        Self {
            command_name: command_name.into(),
            payload_type: TypeInfo::of::<T>(),
            payload: Box::new(payload),
        }
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn payload_type(&self) -> &TypeInfo {
        &self.payload_type
    }

    pub fn payload(&self) -> &dyn Any {
        &*self.payload
    }

    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for CommandMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMessage")
            .field("command_name", &self.command_name)
            .field("payload_type", &self.payload_type.name())
            .finish()
    }
}

/// 事件消息
pub struct EventMessage {
    event_type: String,
    payload_type: TypeInfo,
    payload: Box<dyn Any + Send + Sync>,
}

impl EventMessage {
    pub fn new<E: PropertyAccess>(event_type: impl Into<String>, payload: E) -> Self {
        Self {
            event_type: event_type.into(),
            payload_type: TypeInfo::of::<E>(),
            payload: Box::new(payload),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload_type(&self) -> &TypeInfo {
        &self.payload_type
    }

    pub fn payload(&self) -> &dyn Any {
        &*self.payload
    }

    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for EventMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMessage")
            .field("event_type", &self.event_type)
            .field("payload_type", &self.payload_type.name())
            .finish()
    }
}
