//! 运行配置：从环境变量读取，缺省时使用默认值
//!
//! - `RUST_LOG`：日志过滤（默认 `"info"`）
//! - `CUSTOMERS_CACHE_REFRESH_SECS`：共享缓存令牌刷新间隔（默认 3600）
//! - `CUSTOMERS_DELIVER_INTERVAL_MS`：outbox 投递间隔（默认 1000）
//! - `CUSTOMERS_HANDLER_CONCURRENCY`：单事件处理并发（默认 8）
//! - `CUSTOMERS_STORE_LATENCY_MS`：内存存储模拟 I/O 延迟（默认 0）
//! - `CUSTOMERS_EVENT_BUS_CAPACITY`：事件总线缓冲容量（默认 1024）
use ddd_application::caching::DEFAULT_REFRESH_INTERVAL;
use ddd_domain::eventing::EventEngineConfig;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct CustomersConfig {
    pub log_level: String,
    pub cache_refresh: Duration,
    pub deliver_interval: Duration,
    pub handler_concurrency: usize,
    pub store_latency: Duration,
    pub event_bus_capacity: usize,
}

impl Default for CustomersConfig {
    fn default() -> Self {
        let engine = EventEngineConfig::default();
        Self {
            log_level: "info".to_string(),
            cache_refresh: DEFAULT_REFRESH_INTERVAL,
            deliver_interval: engine.deliver_interval,
            handler_concurrency: engine.handler_concurrency,
            store_latency: Duration::ZERO,
            event_bus_capacity: 1024,
        }
    }
}

impl CustomersConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意键值来源构造配置，无法解析的值回退为默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| u64::from_str(v.trim()).ok());

        Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            cache_refresh: parsed("CUSTOMERS_CACHE_REFRESH_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_refresh),
            deliver_interval: parsed("CUSTOMERS_DELIVER_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.deliver_interval),
            handler_concurrency: parsed("CUSTOMERS_HANDLER_CONCURRENCY")
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(defaults.handler_concurrency),
            store_latency: parsed("CUSTOMERS_STORE_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_latency),
            event_bus_capacity: parsed("CUSTOMERS_EVENT_BUS_CAPACITY")
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(defaults.event_bus_capacity),
        }
    }

    pub fn engine_config(&self) -> EventEngineConfig {
        EventEngineConfig {
            deliver_interval: self.deliver_interval,
            handler_concurrency: self.handler_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = CustomersConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CustomersConfig::default());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache_refresh, Duration::from_secs(3600));
        assert_eq!(config.store_latency, Duration::ZERO);
    }

    #[test]
    fn test_overrides() {
        let config = CustomersConfig::from_lookup(lookup(&[
            ("RUST_LOG", "debug"),
            ("CUSTOMERS_CACHE_REFRESH_SECS", "60"),
            ("CUSTOMERS_DELIVER_INTERVAL_MS", "25"),
            ("CUSTOMERS_HANDLER_CONCURRENCY", "2"),
            ("CUSTOMERS_STORE_LATENCY_MS", "5"),
            ("CUSTOMERS_EVENT_BUS_CAPACITY", "16"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.cache_refresh, Duration::from_secs(60));
        assert_eq!(config.engine_config().deliver_interval, Duration::from_millis(25));
        assert_eq!(config.engine_config().handler_concurrency, 2);
        assert_eq!(config.store_latency, Duration::from_millis(5));
        assert_eq!(config.event_bus_capacity, 16);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = CustomersConfig::from_lookup(lookup(&[
            ("CUSTOMERS_DELIVER_INTERVAL_MS", "0"),
            ("CUSTOMERS_HANDLER_CONCURRENCY", "many"),
        ]));
        let defaults = CustomersConfig::default();
        assert_eq!(config.deliver_interval, defaults.deliver_interval);
        assert_eq!(config.handler_concurrency, defaults.handler_concurrency);
    }
}
