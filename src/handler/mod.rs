//! Handlers that produce their response through a [`ResponseWriter`].

use std::{future::Future, pin::Pin};

use http::request::Parts;

use crate::writer::ResponseWriter;

mod exposition;
mod info;
mod service;

pub use exposition::ExpositionHandler;
pub use info::{InfoHandler, INFO_MESSAGE};
pub use service::HandlerService;

/// Future returned by [`Handler::serve`], borrowing the request and the writer.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Serves one request by writing the response into `writer`.
///
/// The request body is not made available; none of the routes read it.
pub trait Handler: Send + Sync + 'static {
    fn serve<'a>(
        &'a self,
        request: &'a Parts,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a>;
}
