//! 属性访问（Property）
//!
//! 以编译期生成的属性表替代运行时反射：
//! - `PropertyAccess`：类型按名称暴露可读属性（通常由 `#[properties]` 宏生成）；
//! - `Property`：类型擦除后的只读属性访问器；
//! - `RoutingValue`：用于路由比较的统一取值；
//! - `TypeInfo`：类型名称、`TypeId` 与属性表的静态描述。
//!
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

/// 路由取值（可比较）
///
/// 不同宽度的整数按数值比较，`Uuid` 以文本形式参与比较。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RoutingValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i128),
    Text(String),
}

impl RoutingValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RoutingValue::Null)
    }
}

impl fmt::Display for RoutingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingValue::Null => write!(f, "null"),
            RoutingValue::Bool(b) => write!(f, "{b}"),
            RoutingValue::Integer(i) => write!(f, "{i}"),
            RoutingValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// 可转换为路由取值的字段类型
pub trait ToRoutingValue {
    fn to_routing_value(&self) -> RoutingValue;
}

impl ToRoutingValue for RoutingValue {
    fn to_routing_value(&self) -> RoutingValue {
        self.clone()
    }
}

impl ToRoutingValue for str {
    fn to_routing_value(&self) -> RoutingValue {
        RoutingValue::Text(self.to_owned())
    }
}

impl ToRoutingValue for String {
    fn to_routing_value(&self) -> RoutingValue {
        RoutingValue::Text(self.clone())
    }
}

impl ToRoutingValue for bool {
    fn to_routing_value(&self) -> RoutingValue {
        RoutingValue::Bool(*self)
    }
}

impl ToRoutingValue for char {
    fn to_routing_value(&self) -> RoutingValue {
        RoutingValue::Text(self.to_string())
    }
}

impl ToRoutingValue for uuid::Uuid {
    fn to_routing_value(&self) -> RoutingValue {
        RoutingValue::Text(self.to_string())
    }
}

impl<T: ToRoutingValue + ?Sized> ToRoutingValue for &T {
    fn to_routing_value(&self) -> RoutingValue {
        (**self).to_routing_value()
    }
}

impl<T: ToRoutingValue + ?Sized> ToRoutingValue for Box<T> {
    fn to_routing_value(&self) -> RoutingValue {
        (**self).to_routing_value()
    }
}

impl<T: ToRoutingValue + ?Sized> ToRoutingValue for Arc<T> {
    fn to_routing_value(&self) -> RoutingValue {
        (**self).to_routing_value()
    }
}

impl<T: ToRoutingValue> ToRoutingValue for Option<T> {
    fn to_routing_value(&self) -> RoutingValue {
        match self {
            Some(v) => v.to_routing_value(),
            None => RoutingValue::Null,
        }
    }
}

macro_rules! integer_routing_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToRoutingValue for $ty {
                fn to_routing_value(&self) -> RoutingValue {
                    RoutingValue::Integer(*self as i128)
                }
            }
        )*
    };
}

integer_routing_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

type Getter = Arc<dyn Fn(&dyn Any) -> Option<RoutingValue> + Send + Sync>;

/// 类型擦除的只读属性访问器
#[derive(Clone)]
pub struct Property {
    name: &'static str,
    owner: &'static str,
    owner_id: TypeId,
    getter: Getter,
}

impl Property {
    /// 基于具体类型的读取函数构造属性
    pub fn of<T: Any>(name: &'static str, getter: fn(&T) -> RoutingValue) -> Self {
        Self {
            name,
            owner: type_name::<T>(),
            owner_id: TypeId::of::<T>(),
            getter: Arc::new(move |instance: &dyn Any| instance.downcast_ref::<T>().map(getter)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 声明该属性的类型名
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn owner_id(&self) -> TypeId {
        self.owner_id
    }

    /// 读取实例上的属性值；实例类型不匹配时返回 `None`
    pub fn value(&self, instance: &dyn Any) -> Option<RoutingValue> {
        (self.getter)(instance)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish()
    }
}

/// 按名称暴露可读属性的类型
pub trait PropertyAccess: Any + Send + Sync {
    /// 全部属性名（声明顺序）
    const PROPERTY_NAMES: &'static [&'static str];

    /// 按名称查找属性
    fn property(name: &str) -> Option<Property>;
}

/// 类型的静态描述：名称、`TypeId` 与属性表
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo {
    name: &'static str,
    type_id: TypeId,
    property_names: &'static [&'static str],
    lookup: fn(&str) -> Option<Property>,
}

impl TypeInfo {
    pub fn of<T: PropertyAccess>() -> Self {
        Self {
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            property_names: T::PROPERTY_NAMES,
            lookup: T::property,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn property_names(&self) -> &'static [&'static str] {
        self.property_names
    }

    /// 直接按声明名称查找属性
    pub fn property(&self, name: &str) -> Option<Property> {
        (self.lookup)(name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeInfo {}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
