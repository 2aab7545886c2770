//! 客户用例：更新命令、列表/详情查询、缓存键与事件处理
pub mod caching;
pub mod dto;
pub mod event_handlers;
pub mod get_customers;
pub mod update_customer;

pub use caching::CustomerCacheKey;
pub use dto::CustomerDto;
pub use event_handlers::CustomerUpdatedEventHandler;
pub use get_customers::{GetAllCustomersQuery, GetCustomerByIdQuery, GetCustomersQueryHandler};
pub use update_customer::{
    UpdateCustomerCommand, UpdateCustomerCommandHandler, UpdateCustomerCommandValidator,
};
