//! 客户管理：基于 `ddd-domain` / `ddd-application` 的单实体更新流水线
//!
//! 更新命令依次经过校验、处理（查找 → 映射 → 产生事件 → 原子提交）与缓存失效；
//! 已提交的事件由事件引擎从 outbox 投递给订阅者。
//!
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod telemetry;

pub use app::CustomersApp;
pub use config::CustomersConfig;
