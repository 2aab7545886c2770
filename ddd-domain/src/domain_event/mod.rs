//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及将事件与元数据/业务上下文
//! 封装后的 `EventEnvelope`。事件随 `Changeset` 交给存储层，仅在提交成功后才会被投递。

mod business_context;
mod domain_event_trait;
mod event_envelope;
mod metadata;

pub use business_context::BusinessContext;
pub use domain_event_trait::DomainEvent;
pub use event_envelope::EventEnvelope;
pub use metadata::Metadata;
