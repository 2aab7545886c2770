use crate::{
    command::Command,
    command_bus::CommandBus,
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
    localization::{Localizer, MessageCatalog},
    outcome::Outcome,
};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::any::{Any, TypeId, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxAnySend = Box<dyn Any + Send>;

type CmdHandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

type CmdHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync>;

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler，每种命令仅允许一个处理器
/// - 运行时以类型擦除（Any）方式进行调度，并在调用端还原返回值
/// - `send` 面向调用方：把 `AppError` 转为带本地化消息的 `Outcome`
pub struct InMemoryCommandBus {
    handlers: DashMap<TypeId, (&'static str, CmdHandlerFn)>,
    localizer: Arc<dyn Localizer>,
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
            localizer: Arc::new(MessageCatalog::english()),
        }
    }
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    /// 注册命令处理器
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let f: CmdHandlerFn = Arc::new(move |boxed_cmd, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 C）
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => {
                        let out = handler.handle(ctx, *cmd).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: type_name::<C>(),
                        found: "unknown",
                    }),
                }
            })
        });

        match self.handlers.entry(TypeId::of::<C>()) {
            Entry::Occupied(_) => Err(AppError::AlreadyRegisteredCommand { command: C::NAME }),
            Entry::Vacant(slot) => {
                slot.insert((C::NAME, f));
                Ok(())
            }
        }
    }

    /// 分发命令并把结果转为面向调用方的 `Outcome`
    #[tracing::instrument(level = "debug", skip_all, fields(command = C::NAME))]
    pub async fn send<C>(&self, ctx: &AppContext, cmd: C) -> Outcome<C::Output>
    where
        C: Command,
    {
        match self.dispatch(ctx, cmd).await {
            Ok(data) => Outcome::success(data),
            Err(err) => {
                if err.is_cancelled() {
                    tracing::debug!("command cancelled");
                } else {
                    tracing::warn!(error = %err, "command failed");
                }
                Outcome::failure(err.kind(), self.describe(&err))
            }
        }
    }

    /// 获取已注册的命令名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }

    fn describe(&self, err: &AppError) -> Vec<String> {
        match err {
            AppError::Validation(failures) => failures
                .iter()
                .map(|f| self.localizer.format(f.key, &f.args))
                .collect(),
            other => vec![self.localizer.format(other.message_key(), &other.message_args())],
        }
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError>
    where
        C: Command,
    {
        let Some(f) = self
            .handlers
            .get(&TypeId::of::<C>())
            .map(|h| h.value().1.clone())
        else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        let out = (f)(Box::new(cmd), ctx).await?;

        match out.downcast::<C::Output>() {
            Ok(output) => Ok(*output),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<C::Output>(),
                found: "unknown",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FailureKind;
    use crate::validation::ValidationFailure;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Bump {
        by: usize,
    }

    impl Command for Bump {
        const NAME: &'static str = "Bump";
        type Output = usize;
    }

    struct BumpHandler {
        total: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler<Bump> for BumpHandler {
        async fn handle(&self, ctx: &AppContext, cmd: Bump) -> Result<usize, AppError> {
            if ctx.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            match cmd.by {
                0 => Err(AppError::Validation(vec![
                    ValidationFailure::new("by", "validation.positive").with_arg("field", "by"),
                ])),
                404 => Err(AppError::NotFound {
                    entity_type: "Counter",
                    id: "404".into(),
                }),
                n => Ok(self.total.fetch_add(n, Ordering::SeqCst) + n),
            }
        }
    }

    fn bus() -> InMemoryCommandBus {
        let catalog = MessageCatalog::english().with("validation.positive", "'{field}' must be positive.");
        let bus = InMemoryCommandBus::new().with_localizer(Arc::new(catalog));
        bus.register::<Bump, _>(Arc::new(BumpHandler {
            total: AtomicUsize::new(0),
        }))
        .unwrap();
        bus
    }

    #[tokio::test]
    async fn dispatch_returns_handler_output() {
        let bus = bus();
        let ctx = AppContext::default();
        assert_eq!(bus.dispatch(&ctx, Bump { by: 2 }).await.unwrap(), 2);
        assert_eq!(bus.dispatch(&ctx, Bump { by: 3 }).await.unwrap(), 5);
        assert_eq!(bus.registered_commands(), vec!["Bump"]);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let bus = bus();
        let err = bus
            .register::<Bump, _>(Arc::new(BumpHandler {
                total: AtomicUsize::new(0),
            }))
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyRegisteredCommand { command: "Bump" }));
    }

    #[tokio::test]
    async fn unregistered_command_is_handler_not_found() {
        let bus = InMemoryCommandBus::new();
        let err = bus
            .dispatch(&AppContext::default(), Bump { by: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::HandlerNotFound("Bump")));
    }

    #[tokio::test]
    async fn send_localizes_failures() {
        let bus = bus();
        let ctx = AppContext::default();

        let ok = bus.send(&ctx, Bump { by: 1 }).await;
        assert_eq!(ok, Outcome::success(1));

        let missing = bus.send(&ctx, Bump { by: 404 }).await;
        assert_eq!(missing.kind(), Some(FailureKind::NotFound));
        assert_eq!(missing.errors(), ["Counter with id: [404] not found."]);
        assert_eq!(missing.data(), None);

        let invalid = bus.send(&ctx, Bump { by: 0 }).await;
        assert_eq!(invalid.kind(), Some(FailureKind::Validation));
        assert_eq!(invalid.errors(), ["'by' must be positive."]);
    }

    #[tokio::test]
    async fn send_reports_cancellation_separately() {
        let bus = bus();
        let ctx = AppContext::default();
        ctx.cancellation().cancel();

        let out = bus.send(&ctx, Bump { by: 1 }).await;
        assert_eq!(out.kind(), Some(FailureKind::Cancelled));
        assert_eq!(out.errors(), ["The request was cancelled."]);
    }
}
