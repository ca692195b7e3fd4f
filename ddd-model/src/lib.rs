//! DDD 实体模型与子实体路由（ddd-model）
//!
//! 聚合根可以将部分行为委托给子实体（单引用、有序集合或键值映射成员）。
//! 本 crate 解决其中的路由问题：
//! - 给定命令，找出路由键与命令载荷相匹配的唯一子实体；
//! - 给定事件，按转发模式找出应当接收该事件的子实体子集。
//!
//! 组成：
//! - `property` / `property_strategy`：编译期生成的属性表与路由键解析策略；
//! - `entity_model`：实体类型的命令处理能力描述与模型登记表；
//! - `member`：父实体上的结构成员及其子实体元数据；
//! - `forwarding`：事件转发模式与事件路由钩子；
//! - `child_entity`：子实体定义变体、路由键提取与已解析的子实体关系。
//!
//! 聚合加载、事件存储、命令总线与成员发现均不在本 crate 范围内。
//!
//! 典型用法：
//! 1. 为命令载荷与子实体类型标注 `#[properties]` / `#[command]`（见 `ddd-macros`）；
//! 2. 构建子实体 `EntityModel` 并登记到 `EntityModelRegistry`；
//! 3. 以 `StructuralMember` 描述父实体成员，通过 `ChildEntityDefinitions::inspect`
//!    得到 `ChildEntities`；
//! 4. 在父实体处理消息时调用 `route_command` / `route_event`。
//!
pub mod child_entity;
pub mod entity_model;
pub mod error;
pub mod forwarding;
pub mod member;
pub mod message;
pub mod property;
pub mod property_strategy;

// 允许在本 crate 内部通过 ::ddd_model 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::ddd_model 路径。
extern crate self as ddd_model;
