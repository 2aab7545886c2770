//! DDD 应用层基础库（ddd-application）
//!
//! - 命令/查询及其处理器、进程内总线（`InMemoryCommandBus` / `InMemoryQueryBus`）
//! - 应用上下文（业务语境、幂等键、取消令牌）与应用层错误
//! - 面向调用方的结果类型（`Outcome`）与本地化（`Localizer`）
//! - 处理器装饰：校验（`ValidationBehaviour`）与缓存失效（`CacheInvalidationBehaviour`）
//! - 字段映射（`MapOnto`）
//!
pub mod caching;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod context;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod localization;
pub mod mapping;
pub mod outcome;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod validation;

pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
