//! 客户查询：列表与详情，结果缓存在绑定共享失效令牌的内存缓存中
use super::{CustomerCacheKey, CustomerDto};
use crate::domain::Customer;
use async_trait::async_trait;
use ddd_application::caching::{ExpiryTokenSource, MemoryCache};
use ddd_application::context::AppContext;
use ddd_application::error::AppError;
use ddd_application::query::Query;
use ddd_application::query_handler::QueryHandler;
use ddd_domain::aggregate::Aggregate;
use ddd_domain::persist::EntityStore;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct GetAllCustomersQuery;

impl Query for GetAllCustomersQuery {
    const NAME: &'static str = "GetAllCustomers";
    type Dto = Vec<CustomerDto>;
}

#[derive(Debug, Clone)]
pub struct GetCustomerByIdQuery {
    pub id: i32,
}

impl Query for GetCustomerByIdQuery {
    const NAME: &'static str = "GetCustomerById";
    type Dto = CustomerDto;
}

pub struct GetCustomersQueryHandler {
    store: Arc<dyn EntityStore<Customer>>,
    list_cache: Arc<MemoryCache<Vec<CustomerDto>>>,
    item_cache: Arc<MemoryCache<CustomerDto>>,
    expiry: Arc<ExpiryTokenSource>,
}

impl GetCustomersQueryHandler {
    pub fn new(
        store: Arc<dyn EntityStore<Customer>>,
        list_cache: Arc<MemoryCache<Vec<CustomerDto>>>,
        item_cache: Arc<MemoryCache<CustomerDto>>,
        expiry: Arc<ExpiryTokenSource>,
    ) -> Self {
        Self {
            store,
            list_cache,
            item_cache,
            expiry,
        }
    }
}

#[async_trait]
impl QueryHandler<GetAllCustomersQuery> for GetCustomersQueryHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        _q: GetAllCustomersQuery,
    ) -> Result<Vec<CustomerDto>, AppError> {
        if let Some(hit) = self.list_cache.get(CustomerCacheKey::GET_ALL) {
            return Ok(hit);
        }

        // 先取令牌再读存储：读取期间发生的失效会连带作废本次写入
        let token = self.expiry.token();
        let mut customers: Vec<CustomerDto> = self
            .store
            .find_all(ctx.cancellation())
            .await?
            .iter()
            .map(CustomerDto::from)
            .collect();
        customers.sort_by_key(|c| c.id);

        self.list_cache.insert(
            CustomerCacheKey::GET_ALL,
            customers.clone(),
            token,
        );
        tracing::debug!(count = customers.len(), "customer list cached");
        Ok(customers)
    }
}

#[async_trait]
impl QueryHandler<GetCustomerByIdQuery> for GetCustomersQueryHandler {
    async fn handle(&self, ctx: &AppContext, q: GetCustomerByIdQuery) -> Result<CustomerDto, AppError> {
        let key = CustomerCacheKey::by_id_key(q.id);
        if let Some(hit) = self.item_cache.get(&key) {
            return Ok(hit);
        }

        let token = self.expiry.token();
        let customer = self
            .store
            .find_by_id(&q.id, ctx.cancellation())
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity_type: Customer::TYPE,
                id: q.id.to_string(),
            })?;

        let dto = CustomerDto::from(&customer);
        self.item_cache.insert(key, dto.clone(), token);
        Ok(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddd_domain::persist::InMemoryEntityStore;

    fn handler(store: Arc<InMemoryEntityStore<Customer>>) -> (GetCustomersQueryHandler, Arc<ExpiryTokenSource>) {
        let expiry = Arc::new(ExpiryTokenSource::default());
        let handler = GetCustomersQueryHandler::new(
            store,
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryCache::new()),
            expiry.clone(),
        );
        (handler, expiry)
    }

    #[tokio::test]
    async fn list_is_sorted_and_served_from_cache_until_expired() {
        let store = Arc::new(InMemoryEntityStore::<Customer>::new());
        store.seed(Customer::create(2, "Globex", None, None));
        store.seed(Customer::create(1, "Acme", None, None));
        let (handler, expiry) = handler(store.clone());
        let ctx = AppContext::default();

        let first = handler.handle(&ctx, GetAllCustomersQuery).await.unwrap();
        assert_eq!(first.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);

        // 绕过命令直接写入：缓存仍返回旧列表
        store.seed(Customer::create(3, "Initech", None, None));
        let cached = handler.handle(&ctx, GetAllCustomersQuery).await.unwrap();
        assert_eq!(cached.len(), 2);

        expiry.expire();
        let fresh = handler.handle(&ctx, GetAllCustomersQuery).await.unwrap();
        assert_eq!(fresh.len(), 3);
    }

    #[tokio::test]
    async fn by_id_reports_missing_customer() {
        let store = Arc::new(InMemoryEntityStore::<Customer>::new());
        store.seed(Customer::create(1, "Acme", Some("old".into()), None));
        let (handler, _) = handler(store);
        let ctx = AppContext::default();

        let dto = handler
            .handle(&ctx, GetCustomerByIdQuery { id: 1 })
            .await
            .unwrap();
        assert_eq!(dto.description.as_deref(), Some("old"));

        let err = handler
            .handle(&ctx, GetCustomerByIdQuery { id: 99 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity_type: "Customer", ref id } if id == "99"));
    }
}
