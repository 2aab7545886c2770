//! DDD 领域层基础库（ddd-domain）
//!
//! 提供以 DDD 为中心的通用抽象与构件，用于在应用中实现：
//! - 实体（`entity`）与聚合（`aggregate`）建模，`Version` 等值对象（`value_object`）
//! - 领域事件（`domain_event`）及其信封与业务上下文
//! - 按标识查找、原子提交变更集的实体存储（`persist`），带 outbox
//! - 事件系统（`eventing`）：总线、投递器、引擎与处理器
//!
//! 本 crate 尽量保持与存储与传输实现解耦，仅定义领域层接口与最小必要的错误类型，
//! 内存实现用于测试与本地运行。
//!
//! 典型用法：
//! 1. 用 `#[entity]` 定义聚合并实现 `Aggregate`，声明其事件类型；
//! 2. 加载聚合、修改字段，把事件放入 `Changeset`；
//! 3. 通过 `EntityStore::save_changes` 原子提交；
//! 4. 使用 `eventing` 构建事件引擎，把 outbox 中已提交的事件分发给处理器。
//!
pub mod aggregate;
pub mod domain_event;
pub mod entity;
pub mod error;
#[cfg(feature = "eventing")]
pub mod eventing;
pub mod persist;
pub mod value_object;

// 允许在本 crate 内部通过 ::ddd_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::ddd_domain 路径。
extern crate self as ddd_domain;
