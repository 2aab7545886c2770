//! 事件持久化模型（SerializedEvent）
//!
//! 事件在 outbox 与总线上的标准形态：载荷以 JSON 存储，
//! 并冗余聚合标识/版本与业务上下文，便于投递、订阅与审计。
//!
use crate::{
    aggregate::Aggregate,
    domain_event::{DomainEvent, EventEnvelope},
    error::DomainResult,
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedEvent {
    /// 事件唯一标识符
    event_id: String,
    /// 事件类型，处理器据此订阅
    event_type: String,
    /// 事件载荷版本
    event_version: usize,
    /// 聚合 ID
    aggregate_id: String,
    /// 聚合类型
    aggregate_type: String,
    /// 提交后的聚合版本
    aggregate_version: usize,
    /// 关联 ID
    correlation_id: Option<String>,
    /// 因果 ID
    causation_id: Option<String>,
    /// 触发事件的主体类型
    actor_type: Option<String>,
    /// 触发事件的主体 ID
    actor_id: Option<String>,
    /// 事件发生时间
    occurred_at: DateTime<Utc>,
    /// 事件负载
    payload: Value,
}

impl SerializedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> usize {
        self.event_version
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 将载荷还原为具体事件类型
    pub fn payload_as<E>(&self) -> DomainResult<E>
    where
        E: DeserializeOwned,
    {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

impl<A> TryFrom<&EventEnvelope<A>> for SerializedEvent
where
    A: Aggregate,
{
    type Error = serde_json::Error;

    fn try_from(envelope: &EventEnvelope<A>) -> Result<Self, Self::Error> {
        Ok(SerializedEvent {
            event_id: envelope.payload.event_id().to_string(),
            event_type: envelope.payload.event_type().to_string(),
            event_version: envelope.payload.event_version(),
            aggregate_id: envelope.metadata.aggregate_id().to_string(),
            aggregate_type: envelope.metadata.aggregate_type().to_string(),
            aggregate_version: envelope.metadata.aggregate_version(),
            correlation_id: envelope.context.correlation_id().map(str::to_string),
            causation_id: envelope.context.causation_id().map(str::to_string),
            actor_type: envelope.context.actor_type().map(str::to_string),
            actor_id: envelope.context.actor_id().map(str::to_string),
            occurred_at: envelope.payload.occurred_at(),
            payload: serde_json::to_value(&envelope.payload)?,
        })
    }
}

pub fn serialize_events<A>(events: &[EventEnvelope<A>]) -> DomainResult<Vec<SerializedEvent>>
where
    A: Aggregate,
{
    let events = events
        .iter()
        .map(SerializedEvent::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}
