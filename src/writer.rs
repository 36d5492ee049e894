//! Response writing capability and its status-capturing decorator.
//!
//! Handlers in this crate produce their response by writing into a [`ResponseWriter`]
//! rather than returning a value. This lets the metrics middleware slip an
//! [`InstrumentedWriter`] between the handler and the real writer and observe the
//! status code that was actually sent.

use std::io;

use axum::{body::Body, response::Response};
use bytes::{BufMut, BytesMut};
use http::{HeaderMap, StatusCode};

/// Something that can write an HTTP response: headers, a status line, and body bytes.
///
/// The status may be set any number of times until the first body write. After
/// that the head is locked and further status writes have no effect.
pub trait ResponseWriter: Send {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status.
    fn write_header(&mut self, status: StatusCode);

    /// Append bytes to the response body, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// [`io::Write`] adapter over a [`ResponseWriter`], so encoders such as
/// `serde_json` or `writeln!` can target the response body directly.
pub struct BodyWriter<'a, W: ResponseWriter + ?Sized> {
    inner: &'a mut W,
}

impl<'a, W: ResponseWriter + ?Sized> BodyWriter<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self { inner }
    }
}

impl<W: ResponseWriter + ?Sized> io::Write for BodyWriter<'_, W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The concrete writer used when serving a request: collects the head and body
/// in memory and turns them into an axum [`Response`] once the handler is done.
#[derive(Debug)]
pub struct BufferedWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    head_locked: bool,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            head_locked: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for BufferedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for BufferedWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.head_locked {
            tracing::warn!(
                current = self.status.as_u16(),
                ignored = status.as_u16(),
                "superfluous write_header call after the body was written"
            );
            return;
        }
        self.status = status;
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.head_locked = true;
        self.body.put_slice(buf);
        Ok(buf.len())
    }
}

/// Decorates a [`ResponseWriter`] and remembers the status code written through it.
///
/// Everything is forwarded to the inner writer unchanged. The captured status starts
/// at `200 OK` and follows every `write_header` call made before the first body write,
/// mirroring the point at which the inner writer locks its head.
pub struct InstrumentedWriter<'a, W: ResponseWriter + ?Sized> {
    inner: &'a mut W,
    status: StatusCode,
    wrote_body: bool,
}

impl<'a, W: ResponseWriter + ?Sized> InstrumentedWriter<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            status: StatusCode::OK,
            wrote_body: false,
        }
    }

    /// The status the wrapped handler ended up sending.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for InstrumentedWriter<'_, W> {
    #[inline]
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        if !self.wrote_body {
            self.status = status;
        }
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.wrote_body = true;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    struct FailingWriter {
        headers: HeaderMap,
        status: StatusCode,
    }

    impl ResponseWriter for FailingWriter {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn write_header(&mut self, status: StatusCode) {
            self.status = status;
        }

        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection closed"))
        }
    }

    #[test]
    fn status_defaults_to_ok() {
        let mut inner = BufferedWriter::new();
        let mut writer = InstrumentedWriter::new(&mut inner);
        writer.write(b"hello").unwrap();
        assert_eq!(writer.status(), StatusCode::OK);
        assert_eq!(inner.status(), StatusCode::OK);
    }

    #[test]
    fn explicit_status_is_captured_and_forwarded() {
        let mut inner = BufferedWriter::new();
        let mut writer = InstrumentedWriter::new(&mut inner);
        writer.write_header(StatusCode::NOT_FOUND);
        assert_eq!(writer.status(), StatusCode::NOT_FOUND);
        assert_eq!(inner.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn last_status_before_body_wins() {
        let mut inner = BufferedWriter::new();
        let mut writer = InstrumentedWriter::new(&mut inner);
        writer.write_header(StatusCode::ACCEPTED);
        writer.write_header(StatusCode::CREATED);
        writer.write(b"{}").unwrap();
        writer.write_header(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(writer.status(), StatusCode::CREATED);
        assert_eq!(inner.status(), StatusCode::CREATED);
    }

    #[test]
    fn body_and_headers_pass_through() {
        let mut inner = BufferedWriter::new();
        {
            let mut writer = InstrumentedWriter::new(&mut inner);
            writer
                .headers_mut()
                .insert(http::header::CONTENT_TYPE, "text/plain".parse().unwrap());
            writeln!(BodyWriter::new(&mut writer), "line").unwrap();
        }
        let response = inner.into_response();
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn failed_write_does_not_lock_status() {
        let mut inner = FailingWriter {
            headers: HeaderMap::new(),
            status: StatusCode::OK,
        };
        let mut writer = InstrumentedWriter::new(&mut inner);
        let err = writer.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        writer.write_header(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(writer.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(inner.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
