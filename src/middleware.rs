use http::request::Parts;

use crate::{
    handler::{Handler, HandlerFuture},
    registry::MetricsRegistry,
    writer::{InstrumentedWriter, ResponseWriter},
};

/// Wraps a [`Handler`] and records, for each request it serves, the request count
/// by path, the response count by status and the handling duration by path.
///
/// Usually built through [`MetricLayer`](crate::MetricLayer).
#[derive(Clone)]
pub struct MetricHandler<H> {
    inner: H,
    metrics: MetricsRegistry,
}

impl<H> MetricHandler<H> {
    pub fn new(inner: H, metrics: MetricsRegistry) -> Self {
        Self { inner, metrics }
    }
}

impl<H: Handler> Handler for MetricHandler<H> {
    fn serve<'a>(
        &'a self,
        request: &'a Parts,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let path = request.uri.path();
            tracing::debug!(path, "requested path");

            let timer = self.metrics.start_timer(path);
            let mut instrumented = InstrumentedWriter::new(writer);
            self.inner.serve(request, &mut instrumented).await;

            let status = instrumented.status();
            self.metrics.record_status(status);
            self.metrics.record_request(path);

            let elapsed = timer.observe_duration();
            tracing::debug!(path, status = status.as_u16(), ?elapsed, "response time");
        })
    }
}
