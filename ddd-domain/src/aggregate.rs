//! 聚合（Aggregate）抽象
//!
//! 在 `Entity` 之上约束可持久化的聚合根：
//! - `TYPE`：稳定的聚合类型名，用于日志、错误信息与事件元数据；
//! - `Event`：聚合在变更时产生的领域事件类型；
//! - 需可序列化，以便事件载荷携带聚合快照。
//!
use crate::domain_event::DomainEvent;
use crate::entity::Entity;
use serde::{Serialize, de::DeserializeOwned};

/// 聚合根接口
pub trait Aggregate: Entity + Clone + Serialize + DeserializeOwned + 'static {
    const TYPE: &'static str;

    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;
}
