//! 子实体（Child Entity）路由
//!
//! 聚合根将部分行为委托给以结构成员声明的子实体。本模块负责：
//! - 按成员形态（单引用/有序集合/键值映射）选择子实体定义变体；
//! - 在模型构建阶段提取命令路由键并立即校验；
//! - 产出 `ChildEntityRelation`，供父实体在处理消息时解析命令目标与事件接收者。
//!
//! 构建期单线程完成，构建结果只读共享；路由阶段为纯读操作，不做 I/O、不加锁。
//!
mod children;
mod definition;
mod definitions;
mod relation;

pub use children::{ChildEntities, CommandTarget};
pub use definition::{ChildEntityDefinition, extract_command_handler_routing_keys};
pub use definitions::ChildEntityDefinitions;
pub use relation::ChildEntityRelation;
