use super::Customer;
use chrono::{DateTime, Utc};
use ddd_domain::domain_event::DomainEvent;
use serde::{Deserialize, Serialize};

/// 客户已更新：携带更新后（提交前）的客户快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerUpdatedEvent {
    event_id: String,
    occurred_at: DateTime<Utc>,
    customer: Customer,
}

impl CustomerUpdatedEvent {
    pub const EVENT_TYPE: &'static str = "Customer.Updated";

    pub fn new(customer: Customer) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            occurred_at: Utc::now(),
            customer,
        }
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }
}

impl DomainEvent for CustomerUpdatedEvent {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn event_type(&self) -> &str {
        Self::EVENT_TYPE
    }

    fn event_version(&self) -> usize {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_event_gets_a_fresh_id() {
        let customer = Customer::create(1, "Acme", None, None);
        let a = CustomerUpdatedEvent::new(customer.clone());
        let b = CustomerUpdatedEvent::new(customer);
        assert_ne!(a.event_id(), b.event_id());
        assert_eq!(a.event_type(), "Customer.Updated");
        assert_eq!(a.customer().name, "Acme");
    }
}
