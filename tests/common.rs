#![allow(dead_code)]

use axum::{body::Body, Router};
use axum_info_metrics::{server, MetricsRegistry, NoDelay, ServerConfig};
use http::{Request, Response};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

/// Router with the delay switched off, plus the registry it records into.
pub fn app() -> (axum::Router, MetricsRegistry) {
    app_with(ServerConfig::new().with_delay(Arc::new(NoDelay)))
}

pub fn app_with(config: ServerConfig) -> (Router, MetricsRegistry) {
    let metrics = MetricsRegistry::new().unwrap();
    (server::router(&config, metrics.clone()), metrics)
}

pub async fn get(app: &Router, path: &str) -> Response<Body> {
    let req = Request::get(path).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of the exposition line for `series`, e.g. `name{label="value"}`.
pub fn sample(rendered: &str, series: &str) -> Option<f64> {
    rendered.lines().find_map(|line| {
        line.strip_prefix(series)?
            .strip_prefix(' ')?
            .parse()
            .ok()
    })
}

/// Sum of every series of `metric`.
pub fn sum_of(rendered: &str, metric: &str) -> f64 {
    rendered
        .lines()
        .filter_map(|line| line.strip_prefix(metric)?.strip_prefix('{'))
        .filter_map(|rest| rest.rsplit_once(' ')?.1.parse::<f64>().ok())
        .sum()
}
