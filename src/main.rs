use std::process;

use axum_info_metrics::{server, MetricsRegistry, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "axum_info_metrics=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            process::exit(1);
        }
    };

    let metrics = match MetricsRegistry::new() {
        Ok(metrics) => metrics,
        Err(err) => {
            tracing::error!(error = %err, "failed to register metrics");
            process::exit(1);
        }
    };

    if let Err(err) = server::serve(config, metrics).await {
        tracing::error!(error = %err, "server stopped");
        process::exit(1);
    }
}
