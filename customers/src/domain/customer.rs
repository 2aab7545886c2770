use super::CustomerUpdatedEvent;
use chrono::{DateTime, Utc};
use ddd_domain::aggregate::Aggregate;
use ddd_domain::entity::Entity;
use ddd_domain::value_object::Version;
use ddd_macros::entity;

/// 客户
///
/// `id` 创建后不可变；`created_at/created_by` 为审计字段，更新命令不会触碰。
#[entity(id = i32)]
#[derive(Clone, PartialEq)]
pub struct Customer {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl Customer {
    /// 创建尚未持久化的客户
    pub fn create(
        id: i32,
        name: impl Into<String>,
        description: Option<String>,
        created_by: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            created_at: Utc::now(),
            created_by,
            ..Self::new(id, Version::new())
        }
    }
}

impl Aggregate for Customer {
    const TYPE: &'static str = "Customer";
    type Event = CustomerUpdatedEvent;
}
