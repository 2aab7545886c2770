//! 事件总线（EventBus）协议
//!
//! 支持批量发布与 'static 生命周期事件流，以便在 `tokio::spawn` 中消费。
//!
use crate::{error::DomainResult as Result, persist::SerializedEvent};
use async_trait::async_trait;
use futures_core::stream::BoxStream;

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: &SerializedEvent) -> Result<()>;

    async fn publish_batch(&self, events: &[SerializedEvent]) -> Result<()> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }

    /// 返回一个 'static 生命周期的事件流
    async fn subscribe(&self) -> BoxStream<'static, Result<SerializedEvent>>;
}
