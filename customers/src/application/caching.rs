//! 客户缓存键与共享失效令牌
use ddd_application::caching::ExpiryTokenSource;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

static SHARED_EXPIRY_SOURCE: OnceLock<Arc<ExpiryTokenSource>> = OnceLock::new();

pub struct CustomerCacheKey;

impl CustomerCacheKey {
    /// 客户列表缓存键
    pub const GET_ALL: &'static str = "all-Customers";

    pub fn pagination_key(parameters: &str) -> String {
        format!("CustomerCacheKey:CustomersWithPaginationQuery,{parameters}")
    }

    pub fn by_id_key(id: i32) -> String {
        format!("CustomerCacheKey:GetByIdCacheKey,{id}")
    }

    /// 客户类缓存共享的失效令牌来源（进程内唯一）
    pub fn shared_expiry_source() -> Arc<ExpiryTokenSource> {
        SHARED_EXPIRY_SOURCE
            .get_or_init(|| Arc::new(ExpiryTokenSource::default()))
            .clone()
    }

    /// 以给定刷新间隔初始化共享来源；已初始化时返回现有来源
    pub fn init_shared_expiry_source(refresh_interval: Duration) -> Arc<ExpiryTokenSource> {
        SHARED_EXPIRY_SOURCE
            .get_or_init(|| Arc::new(ExpiryTokenSource::new(refresh_interval)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable() {
        assert_eq!(CustomerCacheKey::GET_ALL, "all-Customers");
        assert_eq!(
            CustomerCacheKey::by_id_key(7),
            "CustomerCacheKey:GetByIdCacheKey,7"
        );
        assert_eq!(
            CustomerCacheKey::pagination_key("page=1&size=10"),
            "CustomerCacheKey:CustomersWithPaginationQuery,page=1&size=10"
        );
    }

    #[test]
    fn shared_source_is_a_singleton() {
        let a = CustomerCacheKey::shared_expiry_source();
        let b = CustomerCacheKey::init_shared_expiry_source(Duration::from_secs(1));
        assert!(Arc::ptr_eq(&a, &b));
    }
}
