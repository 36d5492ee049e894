use std::io::Write;

use http::{header::CONTENT_TYPE, request::Parts, HeaderValue, StatusCode};

use super::{Handler, HandlerFuture};
use crate::{
    registry::MetricsRegistry,
    writer::{BodyWriter, ResponseWriter},
};

/// Serves the scrape target: every series of a [`MetricsRegistry`] in the text exposition format.
#[derive(Clone)]
pub struct ExpositionHandler {
    metrics: MetricsRegistry,
}

impl ExpositionHandler {
    pub const CONTENT_TYPE: &'static str = "text/plain; version=0.0.4; charset=utf-8";

    pub fn new(metrics: MetricsRegistry) -> Self {
        Self { metrics }
    }
}

impl Handler for ExpositionHandler {
    fn serve<'a>(
        &'a self,
        _request: &'a Parts,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            writer
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(Self::CONTENT_TYPE));
            let rendered = self.metrics.render();
            let written = BodyWriter::new(&mut *writer).write_all(rendered.as_bytes());
            if let Err(err) = written {
                tracing::warn!(error = %err, "failed to write metrics exposition");
                writer.write_header(StatusCode::INTERNAL_SERVER_ERROR);
            }
        })
    }
}
