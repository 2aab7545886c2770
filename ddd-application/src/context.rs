use ddd_domain::domain_event::BusinessContext;
use tokio_util::sync::CancellationToken;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，例如：
/// - 业务语境（`BusinessContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等，提交时随事件写入 outbox；
/// - 取消令牌（`cancellation`）：调用方放弃请求时取消，存储层在挂起点响应。
///
/// 典型用法：
/// ```rust
/// use ddd_application::context::AppContext;
/// use ddd_domain::domain_event::BusinessContext;
/// use tokio_util::sync::CancellationToken;
///
/// let ctx = AppContext {
///     biz: BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .maybe_causation_id(Some("cau-abc".into()))
///         .maybe_actor_type(Some("user".into()))
///         .maybe_actor_id(Some("u-1".into()))
///         .build(),
///     cancellation: CancellationToken::new(),
/// };
/// assert!(!ctx.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct AppContext {
    /// 业务语境（链路追踪、审计主体、操作因果）
    pub biz: BusinessContext,
    /// 请求级取消令牌
    pub cancellation: CancellationToken,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            biz: BusinessContext::default(),
            cancellation: CancellationToken::new(),
        }
    }
}

impl AppContext {
    pub fn new(biz: BusinessContext) -> Self {
        Self {
            biz,
            ..Self::default()
        }
    }

    /// 替换取消令牌（例如绑定到上游请求的生命周期）
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn business(&self) -> &BusinessContext {
        &self.biz
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
