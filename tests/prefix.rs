mod common;
use common::{body_string, get, sample};

use axum_info_metrics::{server, MetricsRegistry, NoDelay, ServerConfig};
use http::StatusCode;
use std::sync::Arc;

#[tokio::test]
async fn metrics_rendered_with_prefix_and_custom_path() {
    let metrics = MetricsRegistry::builder()
        .with_prefix("pref")
        .build()
        .unwrap();
    let config = ServerConfig::new()
        .with_info_path("/getmetrics")
        .with_delay(Arc::new(NoDelay));
    let app = server::router(&config, metrics.clone());

    let res = get(&app, "/getmetrics").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "\"calling test api\"\n");
    assert_eq!(get(&app, "/getinfo").await.status(), StatusCode::NOT_FOUND);

    let rendered = metrics.render();
    assert_eq!(
        sample(&rendered, r#"pref_http_requests_total{path="/getmetrics"}"#),
        Some(1.0)
    );
    assert_eq!(
        sample(&rendered, r#"pref_response_status{status="200"}"#),
        Some(1.0)
    );
    assert!(!rendered.contains("test_app_"));
}
