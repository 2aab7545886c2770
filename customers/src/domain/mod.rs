//! 客户领域模型
mod customer;
mod events;

pub use customer::Customer;
pub use events::CustomerUpdatedEvent;
