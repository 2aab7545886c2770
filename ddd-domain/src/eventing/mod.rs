//! 事件子系统（eventing）
//!
//! 把已提交的事件交给下游订阅者（缓存失效、通知等）：
//! - `EventDeliverer`：从 outbox 批量取出已提交、待投递的事件；
//! - `EventBus`：统一发布/订阅接口，`InMemoryEventBus` 为进程内实现；
//! - `EventHandler`：对某类/多类/全部事件进行消费；
//! - `EventEngine`：编排“投递 → 订阅 → 分发处理”的长驻任务。
//!
//! 事件只经由 outbox 进入总线，未提交的事件永远不会被投递。
//!
pub mod bus;
pub mod bus_inmemory;
pub mod deliverer;
pub mod engine;
pub mod handler;

pub use bus::EventBus;
pub use bus_inmemory::InMemoryEventBus;
pub use deliverer::EventDeliverer;
pub use engine::{EngineHandle, EventEngine, EventEngineConfig};
pub use handler::{EventHandler, HandledEventType};
