//! 持久化（persist）
//!
//! 定义实体存储协议与一次提交的变更集，支持：
//! - 按标识查找与原子提交（`EntityStore`）；
//! - 显式携带待发布事件的变更集（`Changeset`），取代“挂在实体上的事件队列”；
//! - 事件在持久化层的标准形态（`SerializedEvent`），作为 outbox 记录；
//! - 进程内参考实现（`InMemoryEntityStore`），带乐观锁、取消与故障注入。
//!
mod changeset;
mod entity_store;
mod inmemory;
mod serialized_event;

pub use changeset::Changeset;
pub use entity_store::EntityStore;
pub use inmemory::{InMemoryEntityStore, OutboxStatus};
pub use serialized_event::{SerializedEvent, serialize_events};
