use tower::Layer;

use crate::{middleware::MetricHandler, registry::MetricsRegistry};

/// The middleware layer for recording HTTP metrics into a [`MetricsRegistry`].
///
/// Layering a [`Handler`](crate::handler::Handler) yields a [`MetricHandler`] that
/// counts, classifies and times every request the handler serves.
///
/// # Example
/// ```
/// use axum::Router;
/// use axum_info_metrics::{ExpositionHandler, HandlerService, InfoHandler, MetricLayer, MetricsRegistry};
/// use tower::Layer;
///
/// let metrics = MetricsRegistry::new().unwrap();
/// let layer = MetricLayer::new(metrics.clone());
///
/// let app: Router = Router::new()
///     .route_service("/getinfo", HandlerService::new(layer.layer(InfoHandler::new())))
///     .route_service("/metrics", HandlerService::new(layer.layer(ExpositionHandler::new(metrics))));
/// ```
#[derive(Clone)]
pub struct MetricLayer {
    metrics: MetricsRegistry,
}

impl MetricLayer {
    /// Construct a new [`MetricLayer`] recording into `metrics`.
    pub fn new(metrics: MetricsRegistry) -> Self {
        Self { metrics }
    }
}

impl<H> Layer<H> for MetricLayer {
    type Service = MetricHandler<H>;

    fn layer(&self, inner: H) -> Self::Service {
        MetricHandler::new(inner, self.metrics.clone())
    }
}
