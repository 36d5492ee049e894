//! Route wiring, configuration and the listening loop.

use std::{
    fmt, io,
    net::{AddrParseError, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{routing::get_service, Router};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::trace::TraceLayer;

use crate::{
    delay::{Delay, NoDelay, RandomDelay},
    handler::{ExpositionHandler, HandlerService, InfoHandler},
    layer::MetricLayer,
    registry::MetricsRegistry,
};

/// Default listening address, every interface on port 9000.
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    9000,
);

/// Default route of the info endpoint.
pub const DEFAULT_INFO_PATH: &str = "/getinfo";

/// Route of the scrape target.
pub const METRICS_PATH: &str = "/metrics";

/// Environment variable overriding the listening address.
pub const ADDR_ENV: &str = "TEST_APP_ADDR";

/// Environment variable selecting the artificial delay: `random`, `off` or a number of milliseconds.
pub const DELAY_ENV: &str = "TEST_APP_DELAY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address {value:?}: {source}")]
    Addr {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid delay {0:?}, expected `random`, `off` or a number of milliseconds")]
    Delay(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Runtime settings for the server.
#[derive(Clone)]
pub struct ServerConfig {
    addr: SocketAddr,
    info_path: String,
    delay: Arc<dyn Delay>,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            addr: DEFAULT_ADDR,
            info_path: DEFAULT_INFO_PATH.to_owned(),
            delay: Arc::new(RandomDelay::default()),
        }
    }

    /// Defaults, overridden by [`ADDR_ENV`] and [`DELAY_ENV`] when they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();
        if let Ok(value) = std::env::var(ADDR_ENV) {
            let addr = value
                .parse()
                .map_err(|source| ConfigError::Addr { value, source })?;
            config = config.with_addr(addr);
        }
        if let Ok(value) = std::env::var(DELAY_ENV) {
            config = config.with_delay(parse_delay(&value)?);
        }
        Ok(config)
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Serve the info endpoint on `path` instead of [`DEFAULT_INFO_PATH`].
    pub fn with_info_path(mut self, path: impl Into<String>) -> Self {
        self.info_path = path.into();
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn info_path(&self) -> &str {
        &self.info_path
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("addr", &self.addr)
            .field("info_path", &self.info_path)
            .finish_non_exhaustive()
    }
}

fn parse_delay(value: &str) -> Result<Arc<dyn Delay>, ConfigError> {
    match value.trim() {
        "" | "random" => Ok(Arc::new(RandomDelay::default())),
        "off" | "none" | "0" => Ok(Arc::new(NoDelay)),
        ms => ms
            .parse()
            .map(|ms| Arc::new(Duration::from_millis(ms)) as Arc<dyn Delay>)
            .map_err(|_| ConfigError::Delay(value.to_owned())),
    }
}

/// Build the application router: `GET {info_path}` and `/metrics`, both behind the
/// metrics middleware.
pub fn router(config: &ServerConfig, metrics: MetricsRegistry) -> Router {
    let layer = MetricLayer::new(metrics.clone());

    let info = HandlerService::new(layer.layer(InfoHandler::with_delay(config.delay.clone())));
    let exposition = HandlerService::new(layer.layer(ExpositionHandler::new(metrics)));

    Router::new()
        .route(&config.info_path, get_service(info))
        .route_service(METRICS_PATH, exposition)
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until the listener fails.
pub async fn serve(config: ServerConfig, metrics: MetricsRegistry) -> Result<(), ServeError> {
    let addr = config.addr;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    tracing::info!(%addr, "serving requests");

    let app = router(&config, metrics);
    axum::serve(listener, app).await.map_err(ServeError::Serve)
}
