use anyhow::Context as _;
use customers::application::UpdateCustomerCommand;
use customers::domain::Customer;
use customers::{CustomersApp, CustomersConfig, telemetry};
use ddd_application::context::AppContext;
use ddd_domain::domain_event::BusinessContext;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CustomersConfig::from_env();
    telemetry::init(&config.log_level);

    let app = CustomersApp::new(&config).context("failed to wire customers app")?;
    app.store().seed(Customer::create(1, "Acme", Some("old".into()), Some("admin".into())));
    app.store().seed(Customer::create(2, "Globex", None, Some("admin".into())));

    let engine = app.start_engine().await;

    let ctx = AppContext::new(
        BusinessContext::builder()
            .correlation_id("demo-1".to_string())
            .actor_type("user".to_string())
            .actor_id("demo".to_string())
            .build(),
    );

    let before = app.customers(&ctx).await?;
    println!("customers: {}", serde_json::to_string(&before)?);

    let updated = app
        .update_customer(
            &ctx,
            UpdateCustomerCommand {
                id: 1,
                name: "Acme Corp".into(),
                description: None,
            },
        )
        .await;
    println!("update #1: {}", serde_json::to_string(&updated)?);

    let missing = app
        .update_customer(
            &ctx,
            UpdateCustomerCommand {
                id: 99,
                name: "X".into(),
                description: None,
            },
        )
        .await;
    println!("update #99: {}", serde_json::to_string(&missing)?);

    let invalid = app
        .update_customer(
            &ctx,
            UpdateCustomerCommand {
                id: 2,
                name: String::new(),
                description: None,
            },
        )
        .await;
    println!("update #2: {}", serde_json::to_string(&invalid)?);

    let after = app.customers(&ctx).await?;
    println!("customers: {}", serde_json::to_string(&after)?);

    // 留出一个投递周期，让事件处理器收到已提交的事件
    tokio::time::sleep(config.deliver_interval + Duration::from_millis(100)).await;
    engine.shutdown();
    engine.join().await;
    Ok(())
}
