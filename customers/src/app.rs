//! 组装：存储、命令/查询总线、缓存与事件引擎
use crate::application::{
    CustomerCacheKey, CustomerDto, CustomerUpdatedEventHandler, GetAllCustomersQuery,
    GetCustomerByIdQuery, GetCustomersQueryHandler, UpdateCustomerCommand,
    UpdateCustomerCommandHandler, UpdateCustomerCommandValidator,
};
use crate::config::CustomersConfig;
use crate::domain::Customer;
use ddd_application::caching::{CacheInvalidationBehaviour, ExpiryTokenSource, MemoryCache};
use ddd_application::context::AppContext;
use ddd_application::error::AppError;
use ddd_application::outcome::Outcome;
use ddd_application::query_bus::QueryBus;
use ddd_application::validation::ValidationBehaviour;
use ddd_application::{InMemoryCommandBus, InMemoryQueryBus};
use ddd_domain::eventing::{EngineHandle, EventEngine, EventHandler, InMemoryEventBus};
use ddd_domain::persist::InMemoryEntityStore;
use std::sync::Arc;

pub struct CustomersApp {
    store: Arc<InMemoryEntityStore<Customer>>,
    commands: InMemoryCommandBus,
    queries: InMemoryQueryBus,
    list_cache: Arc<MemoryCache<Vec<CustomerDto>>>,
    item_cache: Arc<MemoryCache<CustomerDto>>,
    expiry: Arc<ExpiryTokenSource>,
    event_bus: Arc<InMemoryEventBus>,
    engine: Arc<EventEngine>,
}

impl CustomersApp {
    pub fn new(config: &CustomersConfig) -> Result<Self, AppError> {
        Self::with_event_handlers(config, Vec::new())
    }

    /// 除内置处理器外，追加额外的事件处理器
    pub fn with_event_handlers(
        config: &CustomersConfig,
        extra_handlers: Vec<Arc<dyn EventHandler>>,
    ) -> Result<Self, AppError> {
        let store = Arc::new(InMemoryEntityStore::<Customer>::new().with_latency(config.store_latency));
        let list_cache: Arc<MemoryCache<Vec<CustomerDto>>> = Arc::new(MemoryCache::new());
        let item_cache: Arc<MemoryCache<CustomerDto>> = Arc::new(MemoryCache::new());
        let expiry = CustomerCacheKey::init_shared_expiry_source(config.cache_refresh);

        let commands = InMemoryCommandBus::new();
        commands.register::<UpdateCustomerCommand, _>(Arc::new(ValidationBehaviour::new(
            CacheInvalidationBehaviour::new(
                UpdateCustomerCommandHandler::new(store.clone()),
                list_cache.clone(),
            ),
            UpdateCustomerCommandValidator,
        )))?;

        let queries = InMemoryQueryBus::new();
        let reader = Arc::new(GetCustomersQueryHandler::new(
            store.clone(),
            list_cache.clone(),
            item_cache.clone(),
            expiry.clone(),
        ));
        queries.register::<GetAllCustomersQuery, _>(reader.clone())?;
        queries.register::<GetCustomerByIdQuery, _>(reader)?;

        let event_bus = Arc::new(InMemoryEventBus::new(config.event_bus_capacity));
        let mut handlers: Vec<Arc<dyn EventHandler>> = vec![Arc::new(CustomerUpdatedEventHandler)];
        handlers.extend(extra_handlers);

        let engine = Arc::new(
            EventEngine::builder()
                .event_bus(event_bus.clone())
                .event_deliverer(store.clone())
                .event_handlers(handlers)
                .config(config.engine_config())
                .build(),
        );

        Ok(Self {
            store,
            commands,
            queries,
            list_cache,
            item_cache,
            expiry,
            event_bus,
            engine,
        })
    }

    /// 启动事件引擎（投递 outbox 并分发给处理器）
    pub async fn start_engine(&self) -> EngineHandle {
        self.engine.clone().start().await
    }

    /// 更新客户，返回面向调用方的结果
    pub async fn update_customer(&self, ctx: &AppContext, cmd: UpdateCustomerCommand) -> Outcome<i32> {
        self.commands.send(ctx, cmd).await
    }

    pub async fn customers(&self, ctx: &AppContext) -> Result<Vec<CustomerDto>, AppError> {
        self.queries.dispatch(ctx, GetAllCustomersQuery).await
    }

    pub async fn customer(&self, ctx: &AppContext, id: i32) -> Result<CustomerDto, AppError> {
        self.queries.dispatch(ctx, GetCustomerByIdQuery { id }).await
    }

    pub fn store(&self) -> &Arc<InMemoryEntityStore<Customer>> {
        &self.store
    }

    pub fn commands(&self) -> &InMemoryCommandBus {
        &self.commands
    }

    pub fn queries(&self) -> &InMemoryQueryBus {
        &self.queries
    }

    pub fn list_cache(&self) -> &Arc<MemoryCache<Vec<CustomerDto>>> {
        &self.list_cache
    }

    pub fn item_cache(&self) -> &Arc<MemoryCache<CustomerDto>> {
        &self.item_cache
    }

    pub fn expiry_source(&self) -> &Arc<ExpiryTokenSource> {
        &self.expiry
    }

    pub fn event_bus(&self) -> &Arc<InMemoryEventBus> {
        &self.event_bus
    }
}
