//! 事件引擎（EventEngine）
//!
//! 统一编排“投递 → 订阅 → 分发处理”的长驻任务：
//! - 周期从 outbox 中继拉取已提交事件并发布至总线，随后标记投递结果；
//! - 订阅总线事件流，按处理器匹配分发并发执行，处理失败记录日志；
//! - 提供关闭与等待的 `EngineHandle`。
//!
use super::handler::HandledEventType;
use super::{EventBus, EventDeliverer, EventHandler};
use crate::persist::SerializedEvent;
use bon::Builder;
use futures_core::stream::BoxStream;
use futures_util::{StreamExt, stream};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

// 导入由 bon::Builder 生成的 typestate 模块与状态转换别名
use self::event_engine_builder::{IsUnset, SetRegistry, State as BuilderState};

#[derive(Builder)]
pub struct EventEngine {
    event_bus: Arc<dyn EventBus>,
    event_deliverer: Arc<dyn EventDeliverer>,
    #[builder(setters(vis = "pub(crate)"))]
    registry: HandlerRegistry,
    #[builder(default)]
    config: EventEngineConfig,
}

// 受 typestate 限制，仅当 `registry` 尚未设置时可调用，链式调用一次即可
impl<S: BuilderState> EventEngineBuilder<S> {
    pub fn event_handlers(
        self,
        handlers: Vec<Arc<dyn EventHandler>>,
    ) -> EventEngineBuilder<SetRegistry<S>>
    where
        <S as BuilderState>::Registry: IsUnset,
    {
        self.registry(HandlerRegistry::new(handlers))
    }
}

impl EventEngine {
    /// 启动事件引擎，返回可用于关闭/等待的句柄
    ///
    /// 先完成总线订阅再启动投递任务，保证首批投递的事件不会错过订阅者。
    pub async fn start(self: Arc<Self>) -> EngineHandle {
        let token = CancellationToken::new();
        let subscription = self.event_bus.subscribe().await;
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(2);

        tasks.push(tokio::spawn(Self::subscribe_loop(
            self.clone(),
            subscription,
            token.clone(),
        )));

        // deliver worker（周期任务）
        {
            let bus = self.event_bus.clone();
            let deliverer = self.event_deliverer.clone();
            let interval = self.config.deliver_interval;

            tasks.push(Self::spawn_periodic(token.clone(), interval, move || {
                let bus = bus.clone();
                let deliverer = deliverer.clone();
                async move {
                    match deliverer.fetch_events().await {
                        Ok(events) => Self::publish_and_mark(&bus, &deliverer, events).await,
                        Err(err) => tracing::warn!(error = %err, "failed to fetch outbox events"),
                    }
                }
            }));
        }

        tracing::debug!(
            handlers = self.registry.len(),
            deliver_interval_ms = self.config.deliver_interval.as_millis() as u64,
            "event engine started"
        );
        EngineHandle { token, tasks }
    }

    fn spawn_periodic<F, Fut>(
        token: CancellationToken,
        interval: Duration,
        mut f: F,
    ) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => f().await,
                }
            }
        })
    }

    async fn publish_and_mark(
        bus: &Arc<dyn EventBus>,
        deliverer: &Arc<dyn EventDeliverer>,
        events: Vec<SerializedEvent>,
    ) {
        if events.is_empty() {
            return;
        }

        match bus.publish_batch(&events).await {
            Ok(()) => {
                let refs: Vec<&SerializedEvent> = events.iter().collect();
                if let Err(err) = deliverer.mark_delivered(&refs).await {
                    tracing::warn!(error = %err, "failed to mark events delivered");
                }
            }
            Err(_batch_err) => {
                // 批量失败时逐条重试，分别标记
                for ev in &events {
                    let marked = match bus.publish(ev).await {
                        Ok(()) => deliverer.mark_delivered(&[ev]).await,
                        Err(e) => {
                            tracing::warn!(event_id = ev.event_id(), error = %e, "publish failed");
                            deliverer.mark_failed(&[ev], &e.to_string()).await
                        }
                    };
                    if let Err(err) = marked {
                        tracing::warn!(event_id = ev.event_id(), error = %err, "failed to mark event");
                    }
                }
            }
        }
    }

    async fn subscribe_loop(
        self: Arc<Self>,
        mut stream: BoxStream<'static, crate::error::DomainResult<SerializedEvent>>,
        token: CancellationToken,
    ) {
        let registry = self.registry.clone();
        let concurrency = self.config.handler_concurrency;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    break;
                }
                maybe_event = stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            let matched = registry.matching(event.event_type());
                            if matched.is_empty() { continue; }

                            stream::iter(matched)
                                .for_each_concurrent(Some(concurrency), |h| {
                                    let ev = event.clone();
                                    async move {
                                        if let Err(err) = h.handle(&ev).await {
                                            tracing::warn!(
                                                handler = h.handler_name(),
                                                event_id = ev.event_id(),
                                                event_type = ev.event_type(),
                                                error = %err,
                                                "event handler failed"
                                            );
                                        }
                                    }
                                })
                                .await;
                        }
                        Some(Err(err)) => {
                            tracing::warn!(error = %err, "event stream error");
                        }
                        None => {
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[derive(Clone, Default)]
struct HandlerRegistry {
    by_type: HashMap<String, Vec<Arc<dyn EventHandler>>>,
    all: Vec<Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        let mut registry = Self::default();

        for h in handlers {
            match h.handled_event_type() {
                HandledEventType::All => registry.all.push(h),
                HandledEventType::One(t) => {
                    registry.by_type.entry(t).or_default().push(h);
                }
                HandledEventType::Many(ts) => {
                    for t in ts {
                        registry.by_type.entry(t).or_default().push(h.clone());
                    }
                }
            }
        }

        registry
    }

    fn matching(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        let mut merged: Vec<Arc<dyn EventHandler>> = Vec::new();
        if let Some(list) = self.by_type.get(event_type) {
            merged.extend(list.iter().cloned());
        }
        merged.extend(self.all.iter().cloned());
        merged
    }

    fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum::<usize>() + self.all.len()
    }
}

/// 事件引擎配置
#[derive(Clone, Copy, Debug)]
pub struct EventEngineConfig {
    /// Outbox -> Bus 的推送间隔
    pub deliver_interval: Duration,
    /// 单事件的处理并发（同一事件广播给多个 handler）
    pub handler_concurrency: usize,
}

impl Default for EventEngineConfig {
    fn default() -> Self {
        Self {
            deliver_interval: Duration::from_secs(1),
            handler_concurrency: 8,
        }
    }
}

/// 引擎运行句柄：用于优雅关闭与等待任务结束
pub struct EngineHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub async fn join(mut self) {
        let tasks = std::mem::take(&mut self.tasks);

        for t in tasks {
            let _ = t.await;
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
