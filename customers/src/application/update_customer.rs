//! 更新客户：查找 → 映射字段 → 产生事件 → 原子提交 → 返回标识
use super::{CustomerCacheKey, CustomerDto};
use crate::domain::{Customer, CustomerUpdatedEvent};
use async_trait::async_trait;
use ddd_application::caching::{CacheInvalidator, ExpiryTokenSource};
use ddd_application::command::Command;
use ddd_application::command_handler::CommandHandler;
use ddd_application::context::AppContext;
use ddd_application::error::AppError;
use ddd_application::mapping::MapOnto;
use ddd_application::validation::{Validate, ValidationFailure};
use ddd_domain::aggregate::Aggregate;
use ddd_domain::persist::{Changeset, EntityStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 名称允许的最大字符数
pub const NAME_MAX_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCustomerCommand {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl Command for UpdateCustomerCommand {
    const NAME: &'static str = "UpdateCustomer";
    type Output = i32;
}

impl CacheInvalidator for UpdateCustomerCommand {
    fn cache_key(&self) -> &str {
        CustomerCacheKey::GET_ALL
    }

    fn shared_expiry_source(&self) -> Option<Arc<ExpiryTokenSource>> {
        Some(CustomerCacheKey::shared_expiry_source())
    }
}

// 只有名称与描述可被更新
impl MapOnto<Customer> for UpdateCustomerCommand {
    fn map_onto(&self, target: &mut Customer) {
        target.name = self.name.clone();
        target.description = self.description.clone();
    }
}

impl From<CustomerDto> for UpdateCustomerCommand {
    fn from(dto: CustomerDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
        }
    }
}

pub struct UpdateCustomerCommandHandler {
    store: Arc<dyn EntityStore<Customer>>,
}

impl UpdateCustomerCommandHandler {
    pub fn new(store: Arc<dyn EntityStore<Customer>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<UpdateCustomerCommand> for UpdateCustomerCommandHandler {
    #[tracing::instrument(level = "debug", skip_all, fields(customer_id = cmd.id))]
    async fn handle(&self, ctx: &AppContext, cmd: UpdateCustomerCommand) -> Result<i32, AppError> {
        let Some(mut customer) = self.store.find_by_id(&cmd.id, ctx.cancellation()).await? else {
            return Err(AppError::NotFound {
                entity_type: Customer::TYPE,
                id: cmd.id.to_string(),
            });
        };

        cmd.map_onto(&mut customer);
        let event = CustomerUpdatedEvent::new(customer.clone());

        self.store
            .save_changes(
                Changeset::new(customer).with_event(event),
                ctx.business(),
                ctx.cancellation(),
            )
            .await?;

        tracing::debug!("customer updated");
        Ok(cmd.id)
    }
}

/// 名称必填且不超过 256 个字符
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateCustomerCommandValidator;

impl Validate<UpdateCustomerCommand> for UpdateCustomerCommandValidator {
    fn validate(&self, cmd: &UpdateCustomerCommand) -> Vec<ValidationFailure> {
        let mut failures = Vec::new();

        if cmd.name.trim().is_empty() {
            failures.push(ValidationFailure::new("name", "validation.required").with_arg("field", "Name"));
        } else if cmd.name.chars().count() > NAME_MAX_LENGTH {
            failures.push(
                ValidationFailure::new("name", "validation.max_length")
                    .with_arg("field", "Name")
                    .with_arg("max", NAME_MAX_LENGTH),
            );
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddd_domain::domain_event::DomainEvent;
    use ddd_domain::entity::Entity;
    use ddd_domain::persist::InMemoryEntityStore;

    fn command(id: i32, name: &str, description: Option<&str>) -> UpdateCustomerCommand {
        UpdateCustomerCommand {
            id,
            name: name.into(),
            description: description.map(Into::into),
        }
    }

    #[test]
    fn mapping_touches_only_name_and_description() {
        let mut customer = Customer::create(1, "Acme", Some("old".into()), Some("admin".into()));
        let before = customer.clone();

        command(1, "Acme Corp", None).map_onto(&mut customer);

        assert_eq!(customer.name, "Acme Corp");
        assert_eq!(customer.description, None);
        assert_eq!(customer.id(), before.id());
        assert_eq!(customer.version(), before.version());
        assert_eq!(customer.created_at, before.created_at);
        assert_eq!(customer.created_by, before.created_by);
    }

    #[test]
    fn command_is_built_from_read_model() {
        let cmd = UpdateCustomerCommand::from(CustomerDto {
            id: 3,
            name: "Initech".into(),
            description: Some("software".into()),
        });
        assert_eq!(cmd, command(3, "Initech", Some("software")));
        assert_eq!(cmd.cache_key(), "all-Customers");
        assert!(cmd.shared_expiry_source().is_some());
    }

    #[test]
    fn validator_requires_bounded_name() {
        let v = UpdateCustomerCommandValidator;
        assert!(v.validate(&command(1, "Acme", None)).is_empty());
        assert!(v.validate(&command(1, &"x".repeat(NAME_MAX_LENGTH), None)).is_empty());

        let failures = v.validate(&command(1, "  ", None));
        assert_eq!(failures[0].key, "validation.required");

        let failures = v.validate(&command(1, &"x".repeat(NAME_MAX_LENGTH + 1), None));
        assert_eq!(failures[0].key, "validation.max_length");
        assert!(failures[0].args.contains(&("max", "256".to_string())));
    }

    #[tokio::test]
    async fn handler_commits_mapped_entity_with_one_event() {
        let store = Arc::new(InMemoryEntityStore::<Customer>::new());
        store.seed(Customer::create(1, "Acme", Some("old".into()), None));
        let handler = UpdateCustomerCommandHandler::new(store.clone());

        let id = handler
            .handle(&AppContext::default(), command(1, "Acme Corp", None))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let stored = store.get(&1).unwrap();
        assert_eq!(stored.name, "Acme Corp");
        assert_eq!(stored.description, None);

        let pending = store.pending_events();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event_type(), CustomerUpdatedEvent::EVENT_TYPE);
        let event: CustomerUpdatedEvent = pending[0].payload_as().unwrap();
        assert_eq!(event.customer().name, "Acme Corp");
        assert!(!event.event_id().is_empty());
    }

    #[tokio::test]
    async fn handler_allows_empty_name_without_validation_stage() {
        let store = Arc::new(InMemoryEntityStore::<Customer>::new());
        store.seed(Customer::create(5, "Acme", None, None));
        let handler = UpdateCustomerCommandHandler::new(store.clone());

        handler
            .handle(&AppContext::default(), command(5, "", None))
            .await
            .unwrap();
        assert_eq!(store.get(&5).unwrap().name, "");
    }
}
