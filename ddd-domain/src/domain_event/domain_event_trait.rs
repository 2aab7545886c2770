use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 事件唯一标识
    fn event_id(&self) -> &str;

    /// 事件类型（形如 `Customer.Updated`），事件处理器按此订阅
    fn event_type(&self) -> &str;

    /// 事件载荷版本
    fn event_version(&self) -> usize;

    /// 事件发生时间
    fn occurred_at(&self) -> DateTime<Utc>;
}
