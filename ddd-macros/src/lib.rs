//! 领域建模过程宏（ddd-macros）
//!
//! - `#[entity]`：为具名字段结构体补齐 `id`/`version` 字段并实现 `Entity`
//! - `#[value_object]`：为值对象合并值语义所需的派生
//!
use proc_macro::TokenStream;

mod derive_utils;
mod entity;
mod field_utils;
mod value_object;

/// 实体宏
/// - 追加字段：`id: IdType`, `version: Version`（若缺失）并置于字段最前
/// - 自动实现 `::ddd_domain::entity::Entity`（`new/id/version/set_version`）
/// - 支持参数：`#[entity(id = IdType, debug = true|false)]`，`id` 默认 `String`
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 值对象宏
/// - 支持结构体（具名或 tuple）与枚举
/// - 参数：`#[value_object(debug = true|false)]`
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
