use crate::domain::CustomerUpdatedEvent;
use async_trait::async_trait;
use ddd_domain::entity::Entity;
use ddd_domain::eventing::{EventHandler, HandledEventType};
use ddd_domain::persist::SerializedEvent;

/// 客户更新事件处理器：记录已提交的变更
#[derive(Debug, Default)]
pub struct CustomerUpdatedEventHandler;

#[async_trait]
impl EventHandler for CustomerUpdatedEventHandler {
    fn handler_name(&self) -> &str {
        "CustomerUpdatedEventHandler"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One(CustomerUpdatedEvent::EVENT_TYPE.to_string())
    }

    async fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()> {
        let updated: CustomerUpdatedEvent = event.payload_as()?;
        let customer = updated.customer();

        tracing::info!(
            event_id = event.event_id(),
            customer_id = *customer.id(),
            version = event.aggregate_version(),
            correlation_id = event.correlation_id(),
            name = %customer.name,
            "customer updated"
        );
        Ok(())
    }
}
