//! 事件中继（EventDeliverer）
//!
//! 从 outbox 批量取出已提交、待投递的事件，并在发布后标记成功或失败。
//!
use crate::{error::DomainResult as Result, persist::SerializedEvent};
use async_trait::async_trait;

#[async_trait]
pub trait EventDeliverer: Send + Sync {
    /// 拉取待投递的事件
    async fn fetch_events(&self) -> Result<Vec<SerializedEvent>>;

    /// 将事件标记为已成功投递
    async fn mark_delivered(&self, events: &[&SerializedEvent]) -> Result<()>;

    /// 将事件标记为投递失败（累计尝试次数）
    async fn mark_failed(&self, events: &[&SerializedEvent], reason: &str) -> Result<()>;
}
