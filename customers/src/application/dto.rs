use crate::domain::Customer;
use ddd_application::dto::Dto;
use ddd_domain::entity::Entity;
use serde::{Deserialize, Serialize};

/// 客户读模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl Dto for CustomerDto {}

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        Self {
            id: *customer.id(),
            name: customer.name.clone(),
            description: customer.description.clone(),
        }
    }
}
