//! API server entry point.

use api::config::Config;
use api::scheduler::Scheduler;
use event_store::{EventStore, InMemoryEventStore, PostgresEventStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Serves the API over `event_store` until a shutdown signal arrives.
async fn run<S: EventStore + Clone + 'static>(
    config: Config,
    event_store: S,
    metrics_handle: PrometheusHandle,
) {
    let state = api::create_state(event_store, config.minutes_to_payment_timeout);

    let scheduler = if config.scheduler_enabled {
        let (scheduler, stop) = Scheduler::new(state.item_service.clone(), config.scheduler_interval);
        Some((tokio::spawn(scheduler.run()), stop))
    } else {
        tracing::info!("scheduler disabled");
        None
    };

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(
        %addr,
        minutes_to_payment_timeout = config.minutes_to_payment_timeout,
        "starting API server"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    if let Some((handle, stop)) = scheduler {
        let _ = stop.send(true);
        if let Err(error) = handle.await {
            tracing::warn!(%error, "scheduler task ended abnormally");
        }
    }

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the event store and serve
    match config.database_url.clone() {
        Some(url) => {
            let event_store = PostgresEventStore::connect(&url)
                .await
                .expect("failed to connect to PostgreSQL");
            tracing::info!("using PostgreSQL event store");
            run(config, event_store, metrics_handle).await;
        }
        None => {
            tracing::info!("using in-memory event store");
            run(config, InMemoryEventStore::new(), metrics_handle).await;
        }
    }
}
