//! 结构成员（StructuralMember）
//!
//! 父实体上声明的字段及其静态形态：
//! - `Single`：单个子实体引用（可缺省）；
//! - `Sequence`：有序子实体集合；
//! - `Keyed`：按键索引的子实体映射；
//! - `Value`：普通值字段（不是子实体成员）。
//!
//! 成员携带可选的 `MemberMetadata`（子实体声明）。元数据由外部发现机制在
//! 模型构建阶段附加，本模块只消费已类型化的结构。
//!
use crate::error::{ModelError, ModelResult};
use crate::forwarding::{EventForwardingFilter, ForwardingMode};
use crate::property::{PropertyAccess, TypeInfo};
use bon::Builder;
use serde::Deserialize;
use std::any::{Any, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// 子实体成员元数据
#[derive(Builder, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberMetadata {
    /// 是否将命令转发给子实体
    #[builder(default = true)]
    #[serde(default = "enabled")]
    forward_commands: bool,
    /// 是否将事件转发给子实体
    #[builder(default = true)]
    #[serde(default = "enabled")]
    forward_events: bool,
    /// 声明的事件转发模式（仅在 `forward_events` 开启时生效）
    #[builder(default)]
    #[serde(default)]
    event_forwarding_mode: ForwardingMode,
    /// 事件路由键（缺省时使用子实体模型的路由键）
    #[builder(into)]
    #[serde(default)]
    event_routing_key: Option<String>,
    /// `Custom` 模式下的过滤器
    #[serde(skip)]
    forwarding_filter: Option<Arc<dyn EventForwardingFilter>>,
}

fn enabled() -> bool {
    true
}

impl Default for MemberMetadata {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MemberMetadata {
    /// 从属性映射解析元数据
    ///
    /// 识别的键：`forwardCommands`、`forwardEvents`、`eventForwardingMode`、
    /// `eventRoutingKey`；空字符串路由键视为未声明。
    pub fn from_attributes(
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> ModelResult<Self> {
        let mut metadata: Self = serde_json::from_value(serde_json::Value::Object(attributes))?;
        if metadata.event_routing_key.as_deref() == Some("") {
            metadata.event_routing_key = None;
        }
        Ok(metadata)
    }

    pub fn forward_commands(&self) -> bool {
        self.forward_commands
    }

    pub fn forward_events(&self) -> bool {
        self.forward_events
    }

    pub fn event_forwarding_mode(&self) -> ForwardingMode {
        self.event_forwarding_mode
    }

    pub fn event_routing_key(&self) -> Option<&str> {
        self.event_routing_key.as_deref()
    }

    pub fn forwarding_filter(&self) -> Option<&Arc<dyn EventForwardingFilter>> {
        self.forwarding_filter.as_ref()
    }
}

impl fmt::Debug for MemberMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMetadata")
            .field("forward_commands", &self.forward_commands)
            .field("forward_events", &self.forward_events)
            .field("event_forwarding_mode", &self.event_forwarding_mode)
            .field("event_routing_key", &self.event_routing_key)
            .field("forwarding_filter", &self.forwarding_filter.is_some())
            .finish()
    }
}

/// 成员标识（用于诊断信息），形如 `Order.lines`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId {
    declaring_type: String,
    member: String,
}

impl MemberId {
    pub fn new(declaring_type: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            member: member.into(),
        }
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn member(&self) -> &str {
        &self.member
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.member)
    }
}

/// 成员静态形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Single,
    Sequence,
    Keyed,
    Value,
}

/// 按键索引的子实体容器
///
/// 命令路由取第一个匹配的子实体，事件接收者按 `child_values` 的迭代顺序排列。
/// `HashMap` 的迭代顺序不确定；顺序有意义时使用 `BTreeMap`。
pub trait KeyedChildren: 'static {
    type Child: PropertyAccess;

    fn child_values(&self) -> Box<dyn Iterator<Item = &Self::Child> + '_>;
}

impl<K: 'static, V: PropertyAccess, S: 'static> KeyedChildren for HashMap<K, V, S> {
    type Child = V;

    fn child_values(&self) -> Box<dyn Iterator<Item = &V> + '_> {
        Box::new(self.values())
    }
}

impl<K: 'static, V: PropertyAccess> KeyedChildren for BTreeMap<K, V> {
    type Child = V;

    fn child_values(&self) -> Box<dyn Iterator<Item = &V> + '_> {
        Box::new(self.values())
    }
}

pub(crate) type Children<'a> = Box<dyn Iterator<Item = &'a dyn Any> + 'a>;

// 读取父实体上某成员当前持有的全部子实体
trait ChildAccess<P>: Send + Sync {
    fn children<'a>(&self, parent: &'a P) -> Children<'a>;
}

struct SingleAccess<P, C> {
    get: fn(&P) -> Option<&C>,
}

impl<P: 'static, C: Any> ChildAccess<P> for SingleAccess<P, C> {
    fn children<'a>(&self, parent: &'a P) -> Children<'a> {
        Box::new((self.get)(parent).into_iter().map(|c| c as &dyn Any))
    }
}

struct SequenceAccess<P, C> {
    get: fn(&P) -> &[C],
}

impl<P: 'static, C: Any> ChildAccess<P> for SequenceAccess<P, C> {
    fn children<'a>(&self, parent: &'a P) -> Children<'a> {
        Box::new((self.get)(parent).iter().map(|c| c as &dyn Any))
    }
}

struct KeyedAccess<P, M> {
    get: fn(&P) -> &M,
}

impl<P: 'static, M: KeyedChildren> ChildAccess<P> for KeyedAccess<P, M> {
    fn children<'a>(&self, parent: &'a P) -> Children<'a> {
        Box::new((self.get)(parent).child_values().map(|c| c as &dyn Any))
    }
}

enum Shape<P> {
    Child {
        kind: MemberKind,
        child_type: TypeInfo,
        access: Arc<dyn ChildAccess<P>>,
    },
    Value,
}

/// 父实体 `P` 上的结构成员
pub struct StructuralMember<P> {
    name: &'static str,
    declared_type: &'static str,
    shape: Shape<P>,
    metadata: Option<MemberMetadata>,
}

impl<P: 'static> StructuralMember<P> {
    /// 单个子实体引用
    pub fn single<C: PropertyAccess>(name: &'static str, get: fn(&P) -> Option<&C>) -> Self {
        Self::child(
            name,
            type_name::<C>(),
            MemberKind::Single,
            TypeInfo::of::<C>(),
            Arc::new(SingleAccess { get }),
        )
    }

    /// 有序子实体集合；子实体模型取元素类型
    pub fn sequence<C: PropertyAccess>(name: &'static str, get: fn(&P) -> &[C]) -> Self {
        Self::child(
            name,
            type_name::<[C]>(),
            MemberKind::Sequence,
            TypeInfo::of::<C>(),
            Arc::new(SequenceAccess { get }),
        )
    }

    /// 键值映射；子实体模型取值类型
    pub fn keyed<M: KeyedChildren>(name: &'static str, get: fn(&P) -> &M) -> Self {
        Self::child(
            name,
            type_name::<M>(),
            MemberKind::Keyed,
            TypeInfo::of::<M::Child>(),
            Arc::new(KeyedAccess { get }),
        )
    }

    /// 普通值字段
    pub fn value<T: ?Sized>(name: &'static str) -> Self {
        Self {
            name,
            declared_type: type_name::<T>(),
            shape: Shape::Value,
            metadata: None,
        }
    }

    fn child(
        name: &'static str,
        declared_type: &'static str,
        kind: MemberKind,
        child_type: TypeInfo,
        access: Arc<dyn ChildAccess<P>>,
    ) -> Self {
        Self {
            name,
            declared_type,
            shape: Shape::Child {
                kind,
                child_type,
                access,
            },
            metadata: None,
        }
    }
}

impl<P> StructuralMember<P> {
    pub fn with_metadata(mut self, metadata: MemberMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 以属性映射（JSON 对象）附加元数据
    pub fn with_attributes(self, attributes: serde_json::Value) -> ModelResult<Self> {
        let serde_json::Value::Object(attributes) = attributes else {
            return Err(ModelError::InvalidMetadata {
                reason: format!("member {}: attributes must be an object", self.name),
            });
        };
        Ok(self.with_metadata(MemberMetadata::from_attributes(attributes)?))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> &'static str {
        self.declared_type
    }

    pub fn kind(&self) -> MemberKind {
        match &self.shape {
            Shape::Child { kind, .. } => *kind,
            Shape::Value => MemberKind::Value,
        }
    }

    /// 子实体类型：单引用为成员自身类型，集合/映射为元素类型
    pub fn child_type(&self) -> Option<&TypeInfo> {
        match &self.shape {
            Shape::Child { child_type, .. } => Some(child_type),
            Shape::Value => None,
        }
    }

    pub fn metadata(&self) -> Option<&MemberMetadata> {
        self.metadata.as_ref()
    }

    pub(crate) fn children<'a>(&self, parent: &'a P) -> Children<'a> {
        match &self.shape {
            Shape::Child { access, .. } => access.children(parent),
            Shape::Value => Box::new(std::iter::empty()),
        }
    }
}

impl<P> Clone for StructuralMember<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            declared_type: self.declared_type,
            shape: match &self.shape {
                Shape::Child {
                    kind,
                    child_type,
                    access,
                } => Shape::Child {
                    kind: *kind,
                    child_type: *child_type,
                    access: access.clone(),
                },
                Shape::Value => Shape::Value,
            },
            metadata: self.metadata.clone(),
        }
    }
}

impl<P> fmt::Debug for StructuralMember<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralMember")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("declared_type", &self.declared_type)
            .field("metadata", &self.metadata)
            .finish()
    }
}
