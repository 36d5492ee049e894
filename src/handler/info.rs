use std::{io::Write, sync::Arc};

use http::{header::CONTENT_TYPE, request::Parts, HeaderValue, StatusCode};
use serde::Serialize;

use super::{Handler, HandlerFuture};
use crate::{
    delay::{Delay, RandomDelay},
    writer::{BodyWriter, ResponseWriter},
};

/// The payload served by [`InfoHandler`].
pub const INFO_MESSAGE: &str = "calling test api";

/// Answers with [`INFO_MESSAGE`] as a JSON string, after an optional artificial delay.
#[derive(Clone)]
pub struct InfoHandler {
    delay: Arc<dyn Delay>,
}

impl InfoHandler {
    /// Info handler with the default random delay of up to 100ms.
    pub fn new() -> Self {
        Self::with_delay(Arc::new(RandomDelay::default()))
    }

    pub fn with_delay(delay: Arc<dyn Delay>) -> Self {
        Self { delay }
    }
}

impl Default for InfoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for InfoHandler {
    fn serve<'a>(
        &'a self,
        _request: &'a Parts,
        writer: &'a mut dyn ResponseWriter,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            writer
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

            let delay = self.delay.next_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if let Err(err) = write_json(writer, INFO_MESSAGE) {
                tracing::warn!(error = %err, "failed to encode info response");
                writer.write_header(StatusCode::INTERNAL_SERVER_ERROR);
                let _ = writeln!(BodyWriter::new(writer), "{err}");
            }
        })
    }
}

/// Encodes `value` followed by a newline and writes it in a single body write.
fn write_json<W, T>(writer: &mut W, value: &T) -> serde_json::Result<()>
where
    W: ResponseWriter + ?Sized,
    T: Serialize + ?Sized,
{
    let mut buf = serde_json::to_vec(value)?;
    buf.push(b'\n');
    BodyWriter::new(writer)
        .write_all(&buf)
        .map_err(serde_json::Error::io)
}
