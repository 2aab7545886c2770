//! 共享失效令牌是进程级的，本文件只放一个测试以免与其他用例互相干扰
use customers::application::{CustomerCacheKey, UpdateCustomerCommand};
use customers::domain::Customer;
use customers::{CustomersApp, CustomersConfig};
use ddd_application::context::AppContext;
use std::sync::Arc;
use std::time::Duration;

fn rename(id: i32, name: &str) -> UpdateCustomerCommand {
    UpdateCustomerCommand {
        id,
        name: name.into(),
        description: None,
    }
}

// 存储每次查找/提交耗时 100ms：
// 更新 1 在 [0, 200) 内完成；更新 2 在 150 开始、350 提交；
// 210 时读取客户 2（读到旧名称并缓存），此时更新 1 已经换发过共享令牌。
#[tokio::test(start_paused = true)]
async fn read_cached_during_an_in_flight_update_is_dropped_when_it_commits() {
    let config = CustomersConfig {
        store_latency: Duration::from_millis(100),
        ..CustomersConfig::default()
    };
    let app = Arc::new(CustomersApp::new(&config).unwrap());
    app.store().seed(Customer::create(1, "Acme", None, None));
    app.store().seed(Customer::create(2, "Globex", None, None));
    let ctx = AppContext::default();

    let first = {
        let app = app.clone();
        tokio::spawn(async move {
            app.update_customer(&AppContext::default(), rename(1, "Acme Corp"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let second = {
        let app = app.clone();
        tokio::spawn(async move {
            app.update_customer(&AppContext::default(), rename(2, "Globex Corp"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(first.await.unwrap().succeeded());

    let during = app.customer(&ctx, 2).await.unwrap();
    assert_eq!(during.name, "Globex");
    assert!(app.item_cache().contains(&CustomerCacheKey::by_id_key(2)));

    assert!(second.await.unwrap().succeeded());
    assert_eq!(app.store().get(&2).unwrap().name, "Globex Corp");
    assert!(!app.item_cache().contains(&CustomerCacheKey::by_id_key(2)));
    assert_eq!(app.customer(&ctx, 2).await.unwrap().name, "Globex Corp");
}
