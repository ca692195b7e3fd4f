//! ddd-model 的过程宏
//!
//! - `#[properties]`：为结构体生成编译期属性表（`PropertyAccess`），替代运行时反射；
//! - `#[command]`：在属性表之外实现 `Command`，声明命令名。
//!
use proc_macro::TokenStream;

mod command;
mod properties;

/// 属性表宏
/// - 每个具名字段暴露为同名属性，字段类型需实现 `ToRoutingValue`
/// - 字段参数：`#[property(skip)]`、`#[property(rename = "...")]`
#[proc_macro_attribute]
pub fn properties(attr: TokenStream, item: TokenStream) -> TokenStream {
    properties::expand(attr, item)
}

/// 命令宏
/// - 生成属性表并实现 `::ddd_model::message::Command`
/// - 支持参数：`#[command(name = "...")]`，默认使用结构体名
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr, item)
}
