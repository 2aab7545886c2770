//! 缓存与失效（Caching）
//!
//! - `ExpiryToken`：取消令牌 + 截止时间，被取消或过期后关联的缓存项全部失效；
//! - `ExpiryTokenSource`：按实体类型共享的令牌来源，过期后惰性换发新令牌；
//! - `MemoryCache`：进程内缓存，每个条目绑定一个 `ExpiryToken`；
//! - `CacheInvalidator` / `CacheInvalidationBehaviour`：命令成功后移除缓存键并使共享令牌失效。
//!
use crate::{command::Command, command_handler::CommandHandler, context::AppContext, error::AppError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 共享令牌的默认刷新间隔
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// 缓存失效令牌，克隆体共享同一取消状态
#[derive(Debug, Clone)]
pub struct ExpiryToken {
    token: CancellationToken,
    expires_at: Instant,
}

impl ExpiryToken {
    pub fn new(ttl: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.expires_at
    }

    pub fn expire(&self) {
        self.token.cancel();
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// 等待令牌被取消或到期
    pub async fn expired(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.expires_at) => {}
        }
    }
}

/// 共享失效令牌来源
#[derive(Debug)]
pub struct ExpiryTokenSource {
    refresh_interval: Duration,
    current: Mutex<ExpiryToken>,
}

impl Default for ExpiryTokenSource {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl ExpiryTokenSource {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            current: Mutex::new(ExpiryToken::new(refresh_interval)),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// 当前令牌；已失效时换发一个新的
    pub fn token(&self) -> ExpiryToken {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_expired() {
            *current = ExpiryToken::new(self.refresh_interval);
        }
        current.clone()
    }

    /// 使当前令牌失效，绑定它的缓存项随之失效
    pub fn expire(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .expire();
    }
}

/// 命令声明其成功后需要失效的缓存
pub trait CacheInvalidator {
    /// 需要移除的缓存键（按实体类型固定）
    fn cache_key(&self) -> &str;

    /// 需要一并失效的共享令牌来源；成功后失效的是它届时的当前令牌
    fn shared_expiry_source(&self) -> Option<Arc<ExpiryTokenSource>>;
}

/// 可按键失效的缓存
pub trait InvalidateCache: Send + Sync {
    /// 移除缓存键，返回是否存在
    fn invalidate(&self, key: &str) -> bool;
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    token: ExpiryToken,
}

/// 进程内缓存
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> MemoryCache<V>
where
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取仍然有效的条目，失效条目顺带清理
    pub fn get(&self, key: &str) -> Option<V> {
        let hit = self
            .entries
            .get(key)
            .map(|e| (!e.token.is_expired()).then(|| e.value.clone()));

        match hit {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, e| e.token.is_expired());
                None
            }
            None => None,
        }
    }

    /// 写入条目，并顺带清扫已失效的条目
    pub fn insert(&self, key: impl Into<String>, value: V, token: ExpiryToken) {
        self.entries.retain(|_, e| !e.token.is_expired());
        self.entries.insert(key.into(), CacheEntry { value, token });
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> InvalidateCache for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn invalidate(&self, key: &str) -> bool {
        self.remove(key)
    }
}

/// 缓存失效装饰器：内层处理器成功后移除缓存键并使共享令牌失效，失败时不做任何事
pub struct CacheInvalidationBehaviour<H> {
    inner: H,
    cache: Arc<dyn InvalidateCache>,
}

impl<H> CacheInvalidationBehaviour<H> {
    pub fn new(inner: H, cache: Arc<dyn InvalidateCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<C, H> CommandHandler<C> for CacheInvalidationBehaviour<H>
where
    C: Command + CacheInvalidator,
    H: CommandHandler<C>,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        let key = cmd.cache_key().to_owned();
        let source = cmd.shared_expiry_source();

        let output = self.inner.handle(ctx, cmd).await?;

        let removed = self.cache.invalidate(&key);
        if let Some(source) = source {
            source.expire();
        }
        tracing::debug!(command = C::NAME, cache_key = %key, removed, "cache invalidated");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn token_expires_at_deadline_and_source_reissues() {
        let source = ExpiryTokenSource::new(Duration::from_secs(10));
        let first = source.token();
        assert!(!first.is_expired());

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(first.is_expired());

        let second = source.token();
        assert!(!second.is_expired());
        assert!(second.expires_at() > first.expires_at());
    }

    #[tokio::test]
    async fn expiring_source_invalidates_bound_entries() {
        let source = ExpiryTokenSource::default();
        let cache = MemoryCache::<Vec<u32>>::new();
        cache.insert("all-Things", vec![1, 2], source.token());
        assert_eq!(cache.get("all-Things"), Some(vec![1, 2]));

        source.expire();
        assert_eq!(cache.get("all-Things"), None);
        assert!(cache.is_empty());

        // 失效后取得的是新令牌
        let fresh = source.token();
        assert!(!fresh.is_expired());
        cache.insert("all-Things", vec![3], fresh);
        assert!(cache.contains("all-Things"));
    }

    #[tokio::test]
    async fn expired_future_resolves_on_cancel() {
        let token = ExpiryToken::new(DEFAULT_REFRESH_INTERVAL);
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.expired().await })
        };
        token.expire();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    struct Touch {
        fail: bool,
        source: Arc<ExpiryTokenSource>,
    }

    impl Command for Touch {
        const NAME: &'static str = "Touch";
        type Output = ();
    }

    impl CacheInvalidator for Touch {
        fn cache_key(&self) -> &str {
            "all-Things"
        }

        fn shared_expiry_source(&self) -> Option<Arc<ExpiryTokenSource>> {
            Some(self.source.clone())
        }
    }

    struct TouchHandler;

    #[async_trait]
    impl CommandHandler<Touch> for TouchHandler {
        async fn handle(&self, _ctx: &AppContext, cmd: Touch) -> Result<(), AppError> {
            if cmd.fail {
                return Err(AppError::Persistence("boom".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn behaviour_invalidates_only_after_success() {
        let source = Arc::new(ExpiryTokenSource::default());
        let cache = Arc::new(MemoryCache::<u32>::new());
        let handler = CacheInvalidationBehaviour::new(TouchHandler, cache.clone());
        let ctx = AppContext::default();

        cache.insert("all-Things", 1, source.token());
        let err = handler
            .handle(
                &ctx,
                Touch {
                    fail: true,
                    source: source.clone(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(cache.get("all-Things"), Some(1));

        handler
            .handle(
                &ctx,
                Touch {
                    fail: false,
                    source: source.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(cache.get("all-Things"), None);
        assert!(!source.token().is_expired());
    }

    /// 命令执行期间被其他命令换发的令牌，同样在本命令成功后失效
    struct SlowTouchHandler {
        started: Arc<tokio::sync::Notify>,
        resume: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl CommandHandler<Touch> for SlowTouchHandler {
        async fn handle(&self, _ctx: &AppContext, _cmd: Touch) -> Result<(), AppError> {
            self.started.notify_one();
            self.resume.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn behaviour_expires_token_reissued_while_in_flight() {
        let source = Arc::new(ExpiryTokenSource::default());
        let cache = Arc::new(MemoryCache::<u32>::new());
        let started = Arc::new(tokio::sync::Notify::new());
        let resume = Arc::new(tokio::sync::Notify::new());
        let handler = Arc::new(CacheInvalidationBehaviour::new(
            SlowTouchHandler {
                started: started.clone(),
                resume: resume.clone(),
            },
            cache.clone(),
        ));

        let in_flight = {
            let handler = handler.clone();
            let source = source.clone();
            tokio::spawn(async move {
                handler
                    .handle(&AppContext::default(), Touch { fail: false, source })
                    .await
            })
        };
        started.notified().await;

        // 另一条命令先行完成，读者在新令牌下写入了旧数据
        source.expire();
        cache.insert("thing:2", 7, source.token());
        assert_eq!(cache.get("thing:2"), Some(7));

        resume.notify_one();
        in_flight.await.unwrap().unwrap();
        assert_eq!(cache.get("thing:2"), None);
    }

    #[tokio::test]
    async fn insert_sweeps_expired_entries() {
        let source = ExpiryTokenSource::default();
        let cache = MemoryCache::<u32>::new();
        cache.insert("thing:1", 1, source.token());
        cache.insert("thing:2", 2, source.token());
        source.expire();

        cache.insert("thing:3", 3, source.token());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("thing:3"), Some(3));
    }
}
