//! 事件处理器（EventHandler）
//!
//! 定义消费某类/多类/全部事件的处理逻辑与元信息（名称、订阅类型）。
//!
use crate::persist::SerializedEvent;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub enum HandledEventType {
    One(String),
    Many(Vec<String>),
    All,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志与失败记录）
    fn handler_name(&self) -> &str;
    /// 返回该处理器订阅的事件类型
    fn handled_event_type(&self) -> HandledEventType;
    /// 处理事件
    async fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()>;
}
