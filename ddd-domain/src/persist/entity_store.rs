//! 实体存储协议（EntityStore）
//!
//! 查找与提交是流水线中仅有的挂起点，两者都接收取消令牌：
//! 令牌在完成前被取消时必须返回 `DomainError::Cancelled` 且不留下任何写入。
//!
use crate::{
    aggregate::Aggregate,
    domain_event::{BusinessContext, EventEnvelope},
    error::DomainResult as Result,
    persist::Changeset,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait EntityStore<A>: Send + Sync
where
    A: Aggregate,
{
    /// 按标识查找实体，不存在时返回 `None`
    async fn find_by_id(&self, id: &A::Id, cancel: &CancellationToken) -> Result<Option<A>>;

    /// 读取全部实体（读模型/列表查询使用）
    async fn find_all(&self, cancel: &CancellationToken) -> Result<Vec<A>>;

    /// 原子提交变更集：聚合与事件要么一起写入，要么都不写入
    ///
    /// - 存储中的版本与 `changeset.expected_version()` 不一致时返回 `VersionConflict`
    /// - 成功时返回已封装（带提交后版本）的事件信封
    async fn save_changes(
        &self,
        changeset: Changeset<A>,
        context: &BusinessContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<EventEnvelope<A>>>;
}

#[async_trait]
impl<A, T> EntityStore<A> for Arc<T>
where
    A: Aggregate,
    T: EntityStore<A> + ?Sized,
{
    async fn find_by_id(&self, id: &A::Id, cancel: &CancellationToken) -> Result<Option<A>> {
        (**self).find_by_id(id, cancel).await
    }

    async fn find_all(&self, cancel: &CancellationToken) -> Result<Vec<A>> {
        (**self).find_all(cancel).await
    }

    async fn save_changes(
        &self,
        changeset: Changeset<A>,
        context: &BusinessContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<EventEnvelope<A>>> {
        (**self).save_changes(changeset, context, cancel).await
    }
}
