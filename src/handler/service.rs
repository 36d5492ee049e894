use std::{
    convert::Infallible,
    future::Future,
    panic,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::response::Response;
use http::{Request, StatusCode};
use tower::Service;

use super::Handler;
use crate::writer::BufferedWriter;

/// Adapts a [`Handler`] into a [`tower::Service`] so it can be mounted on an axum router.
///
/// Every call gets a fresh [`BufferedWriter`], which becomes the response once the
/// handler returns. The handler runs on its own task, so it finishes and gets recorded
/// even if the caller stops waiting for the response.
pub struct HandlerService<H> {
    handler: Arc<H>,
}

impl<H> HandlerService<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<H> Clone for HandlerService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H, B> Service<Request<B>> for HandlerService<H>
where
    H: Handler,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    #[inline]
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let (parts, _body) = request.into_parts();
        let task = tokio::spawn(async move {
            let mut writer = BufferedWriter::new();
            handler.serve(&parts, &mut writer).await;
            writer
        });
        Box::pin(async move {
            match task.await {
                Ok(writer) => Ok(writer.into_response()),
                Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                Err(err) => {
                    tracing::warn!(error = %err, "handler task cancelled");
                    let mut response = Response::default();
                    *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
                    Ok(response)
                }
            }
        })
    }
}
