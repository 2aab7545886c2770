//! 内存版实体存储（InMemoryEntityStore）
//!
//! - 行数据与 outbox 处于同一把锁下，一次提交要么同时写入聚合与事件，要么都不写入；
//! - 提交时按 `Changeset::expected_version` 做乐观锁校验；
//! - 查找与提交前模拟一次 I/O 挂起（可配置延迟），挂起期间响应取消；
//! - 可注入提交故障，模拟存储不可用；
//! - 启用 `eventing` 时同时作为 `EventDeliverer`，向事件引擎提供待投递事件；
//!   投递成功或达到尝试上限的事件随即移出 outbox，只留下计数。
//!
//! 典型用途：测试环境、示例与本地开发。

use crate::{
    aggregate::Aggregate,
    domain_event::{BusinessContext, EventEnvelope},
    entity::Entity,
    error::{DomainError, DomainResult as Result},
    persist::{Changeset, EntityStore, SerializedEvent, serialize_events},
    value_object::Version,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 单条 outbox 事件的最大投递尝试次数，达到后被丢弃
const MAX_DELIVERY_ATTEMPTS: u32 = 5;

/// outbox 中待投递事件的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    Failed { attempts: u32, reason: String },
}

#[derive(Debug, Clone)]
struct OutboxEntry {
    event: SerializedEvent,
    status: OutboxStatus,
}

struct StoreState<A>
where
    A: Aggregate,
{
    rows: HashMap<A::Id, A>,
    outbox: Vec<OutboxEntry>,
    delivered: usize,
    discarded: usize,
}

pub struct InMemoryEntityStore<A>
where
    A: Aggregate,
{
    state: Mutex<StoreState<A>>,
    commit_fault: Mutex<Option<String>>,
    latency: Duration,
}

impl<A> Default for InMemoryEntityStore<A>
where
    A: Aggregate,
{
    fn default() -> Self {
        Self {
            state: Mutex::new(StoreState {
                rows: HashMap::new(),
                outbox: Vec::new(),
                delivered: 0,
                discarded: 0,
            }),
            commit_fault: Mutex::new(None),
            latency: Duration::ZERO,
        }
    }
}

impl<A> InMemoryEntityStore<A>
where
    A: Aggregate,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 为每次查找/提交设置模拟 I/O 延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 直接写入一条已持久化的数据（不产生事件），未持久化版本会被推进到 v1
    pub fn seed(&self, mut aggregate: A) -> A {
        if aggregate.version().is_new() {
            aggregate.set_version(Version::new().next());
        }
        self.state()
            .rows
            .insert(aggregate.id().clone(), aggregate.clone());
        aggregate
    }

    /// 读取当前已提交的数据快照（不经过挂起点）
    pub fn get(&self, id: &A::Id) -> Option<A> {
        self.state().rows.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 之后的提交都以给定原因失败，直到调用 `heal`
    pub fn fail_commits(&self, reason: impl Into<String>) {
        *self.fault() = Some(reason.into());
    }

    pub fn heal(&self) {
        *self.fault() = None;
    }

    /// outbox 中尚未结束的事件及其状态
    pub fn outbox(&self) -> Vec<(SerializedEvent, OutboxStatus)> {
        self.state()
            .outbox
            .iter()
            .map(|e| (e.event.clone(), e.status.clone()))
            .collect()
    }

    pub fn pending_events(&self) -> Vec<SerializedEvent> {
        self.state()
            .outbox
            .iter()
            .map(|e| e.event.clone())
            .collect()
    }

    /// 已成功投递并移出 outbox 的事件数
    pub fn delivered_count(&self) -> usize {
        self.state().delivered
    }

    /// 达到尝试上限后被丢弃的事件数
    pub fn discarded_count(&self) -> usize {
        self.state().discarded
    }

    // 锁内从不 panic，数据始终一致，因此中毒时直接取回内部状态
    fn state(&self) -> MutexGuard<'_, StoreState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fault(&self) -> MutexGuard<'_, Option<String>> {
        self.commit_fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn suspend(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DomainError::Cancelled),
            _ = tokio::time::sleep(self.latency) => Ok(()),
        }
    }

    fn contains(events: &[&SerializedEvent], entry: &OutboxEntry) -> bool {
        events.iter().any(|e| e.event_id() == entry.event.event_id())
    }
}

#[async_trait]
impl<A> EntityStore<A> for InMemoryEntityStore<A>
where
    A: Aggregate,
{
    #[tracing::instrument(level = "debug", skip(self, cancel), fields(aggregate_type = A::TYPE))]
    async fn find_by_id(&self, id: &A::Id, cancel: &CancellationToken) -> Result<Option<A>> {
        self.suspend(cancel).await?;
        Ok(self.get(id))
    }

    #[tracing::instrument(level = "debug", skip(self, cancel), fields(aggregate_type = A::TYPE))]
    async fn find_all(&self, cancel: &CancellationToken) -> Result<Vec<A>> {
        self.suspend(cancel).await?;
        Ok(self.state().rows.values().cloned().collect())
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            aggregate_type = A::TYPE,
            aggregate_id = %changeset.aggregate().id(),
            expected_version = %changeset.expected_version(),
        )
    )]
    async fn save_changes(
        &self,
        changeset: Changeset<A>,
        context: &BusinessContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<EventEnvelope<A>>> {
        self.suspend(cancel).await?;

        let (mut aggregate, expected, events) = changeset.into_parts();
        let committed = expected.next();
        aggregate.set_version(committed);

        // 先完成序列化，失败时不触碰存储
        let envelopes: Vec<EventEnvelope<A>> = events
            .into_iter()
            .map(|e| EventEnvelope::new(aggregate.id(), committed, e, context.clone()))
            .collect();
        let serialized = serialize_events(&envelopes)?;

        if let Some(reason) = self.fault().clone() {
            tracing::warn!(%reason, "commit rejected");
            return Err(DomainError::repository(reason));
        }

        let mut state = self.state();

        let actual = state
            .rows
            .get(aggregate.id())
            .map(|stored| stored.version())
            .unwrap_or_default();
        if actual != expected {
            return Err(DomainError::VersionConflict {
                aggregate_type: A::TYPE,
                aggregate_id: aggregate.id().to_string(),
                expected: expected.value(),
                actual: actual.value(),
            });
        }

        state.rows.insert(aggregate.id().clone(), aggregate);
        state
            .outbox
            .extend(serialized.into_iter().map(|event| OutboxEntry {
                event,
                status: OutboxStatus::Pending,
            }));
        drop(state);

        tracing::debug!(
            committed_version = %committed,
            events = envelopes.len(),
            "changeset committed"
        );
        Ok(envelopes)
    }
}

#[cfg(feature = "eventing")]
#[async_trait]
impl<A> crate::eventing::EventDeliverer for InMemoryEntityStore<A>
where
    A: Aggregate,
{
    async fn fetch_events(&self) -> Result<Vec<SerializedEvent>> {
        Ok(self.pending_events())
    }

    async fn mark_delivered(&self, events: &[&SerializedEvent]) -> Result<()> {
        let mut state = self.state();
        let before = state.outbox.len();
        state.outbox.retain(|entry| !Self::contains(events, entry));
        let removed = before - state.outbox.len();
        state.delivered += removed;
        Ok(())
    }

    async fn mark_failed(&self, events: &[&SerializedEvent], reason: &str) -> Result<()> {
        let mut state = self.state();
        for entry in state.outbox.iter_mut() {
            if Self::contains(events, entry) {
                let attempts = match &entry.status {
                    OutboxStatus::Failed { attempts, .. } => attempts + 1,
                    OutboxStatus::Pending => 1,
                };
                entry.status = OutboxStatus::Failed {
                    attempts,
                    reason: reason.to_string(),
                };
            }
        }

        let before = state.outbox.len();
        state.outbox.retain(|entry| match &entry.status {
            OutboxStatus::Failed { attempts, reason } if *attempts >= MAX_DELIVERY_ATTEMPTS => {
                tracing::warn!(
                    event_id = entry.event.event_id(),
                    attempts,
                    %reason,
                    "event discarded after max delivery attempts"
                );
                false
            }
            _ => true,
        });
        let removed = before - state.outbox.len();
        state.discarded += removed;
        Ok(())
    }
}
