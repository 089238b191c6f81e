//! PostgreSQL integration tests.
//!
//! These need a Docker daemon for the Postgres container and are ignored by
//! default. Run with:
//!
//! ```bash
//! cargo test -p event-store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use event_store::{
    AggregateId, AppendOptions, EventEnvelope, EventStore, EventStoreError, EventStoreExt,
    PostgresEventStore, Version,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // container must outlive the tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();
            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresEventStore {
    let info = get_container_info().await;
    let store = PostgresEventStore::connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE events")
        .execute(store.pool())
        .await
        .unwrap();

    store
}

fn envelope(aggregate_id: AggregateId, version: i64, event_type: &str) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type("ShopItem")
        .event_type(event_type)
        .version(Version::new(version))
        .payload_raw(serde_json::json!({ "type": event_type }))
        .metadata("source", serde_json::json!("test"))
        .build()
        .unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn append_and_read_back_in_order() {
    let store = get_test_store().await;
    let id = AggregateId::new();

    let version = store
        .append(
            vec![envelope(id, 1, "ItemOrdered"), envelope(id, 2, "ItemPaid")],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();
    assert_eq!(version, Version::new(2));

    let events = store.get_events_for_aggregate(id).await.unwrap();
    let types: Vec<_> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, ["ItemOrdered", "ItemPaid"]);
    assert_eq!(
        events[0].metadata.get("source"),
        Some(&serde_json::json!("test"))
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn stale_writer_gets_concurrency_conflict() {
    let store = get_test_store().await;
    let id = AggregateId::new();

    store
        .append(vec![envelope(id, 1, "ItemOrdered")], AppendOptions::expect_new())
        .await
        .unwrap();

    let result = store
        .append(vec![envelope(id, 1, "ItemOrdered")], AppendOptions::expect_new())
        .await;
    assert!(matches!(
        result,
        Err(EventStoreError::ConcurrencyConflict { .. })
    ));

    assert_eq!(
        store.get_aggregate_version(id).await.unwrap(),
        Some(Version::first())
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn unknown_stream_is_empty() {
    let store = get_test_store().await;
    let id = AggregateId::new();

    assert!(store.get_events_for_aggregate(id).await.unwrap().is_empty());
    assert!(!store.aggregate_exists(id).await.unwrap());
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn migrations_are_idempotent() {
    let info = get_container_info().await;
    let pool = PgPool::connect(&info.connection_string).await.unwrap();
    let store = PostgresEventStore::new(pool);

    store.run_migrations().await.unwrap();
    store.run_migrations().await.unwrap();
}
