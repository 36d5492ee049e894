//! A small Axum service with a Prometheus request-metrics middleware.
//!
//! Two routes are served:
//! - `GET /getinfo` answers `"calling test api"` as JSON, after a short random delay;
//! - `/metrics` is the Prometheus scrape target.
//!
//! Both are wrapped by [`MetricLayer`], which decorates the response writer with an
//! [`InstrumentedWriter`] to learn the status code the handler sent, then records
//! into a [`MetricsRegistry`].
//!
//! ## Metrics
//!
//! - `test_app_http_requests_total` (labels: path): the total number of HTTP requests handled (counter)
//! - `test_app_response_status` (labels: status): the number of responses sent, by status code (counter)
//! - `test_app_http_response_time_seconds` (labels: path): the request duration for all HTTP requests handled (histogram)
//!
//! The `test_app` namespace can be changed with [`MetricsRegistryBuilder::with_prefix`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum_info_metrics::{server, MetricsRegistry, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let metrics = MetricsRegistry::new().unwrap();
//!     let config = ServerConfig::new();
//!     server::serve(config, metrics).await.unwrap();
//! }
//! ```
//!
//! Calling the `/metrics` endpoint after one `/getinfo` request exposes:
//! ```not_rust
//! # HELP test_app_http_requests_total Number of get requests.
//! # TYPE test_app_http_requests_total counter
//! test_app_http_requests_total{path="/getinfo"} 1
//!
//! # HELP test_app_response_status Status of HTTP response
//! # TYPE test_app_response_status counter
//! test_app_response_status{status="200"} 1
//!
//! # HELP test_app_http_response_time_seconds Duration of HTTP requests.
//! # TYPE test_app_http_response_time_seconds histogram
//! test_app_http_response_time_seconds_bucket{path="/getinfo",le="0.005"} 0
//! ...
//! test_app_http_response_time_seconds_bucket{path="/getinfo",le="+Inf"} 1
//! test_app_http_response_time_seconds_sum{path="/getinfo"} 0.043251
//! test_app_http_response_time_seconds_count{path="/getinfo"} 1
//! ```

#![allow(clippy::module_name_repetitions, clippy::unreadable_literal)]

/// Namespace shared by the default metric names.
pub const DEFAULT_NAMESPACE: &str = "test_app";

/// Identifies the counter used for requests total.
pub const TEST_APP_HTTP_REQUESTS_TOTAL: &str = "test_app_http_requests_total";

/// Identifies the counter used for responses by status code.
pub const TEST_APP_RESPONSE_STATUS: &str = "test_app_response_status";

/// Identifies the histogram used for request latency.
pub const TEST_APP_HTTP_RESPONSE_TIME_SECONDS: &str = "test_app_http_response_time_seconds";

pub mod delay;
pub mod handler;
mod layer;
mod middleware;
mod registry;
pub mod server;
mod utils;
pub mod writer;

pub use delay::{Delay, NoDelay, RandomDelay};
pub use handler::{ExpositionHandler, Handler, HandlerFuture, HandlerService, InfoHandler};
pub use layer::MetricLayer;
pub use middleware::MetricHandler;
pub use registry::{HistogramTimer, MetricsRegistry, MetricsRegistryBuilder, RegistryError};
pub use server::{ServerConfig, ServeError};
pub use utils::SECONDS_DURATION_BUCKETS;
pub use writer::{BufferedWriter, InstrumentedWriter, ResponseWriter};

pub use metrics;
pub use metrics_exporter_prometheus;
