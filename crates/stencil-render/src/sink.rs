//! The response side of rendering.
//!
//! [`ResponseSink`] is the minimal surface the [`Renderer`](crate::Renderer)
//! needs from an HTTP response: set a header, write the status line, stream
//! body bytes. HTTP integrations implement it over their own response type.
//!
//! [`BufferedResponse`] is an in-memory implementation used by tests and by
//! integrations that build a complete response before sending it.

use std::io;

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

/// A destination for a rendered HTTP response.
pub trait ResponseSink {
    /// Sets (replaces) a response header.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Writes the status line. Called at most once per response.
    fn write_status(&mut self, status: StatusCode);

    /// Writes body bytes.
    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// An in-memory response.
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    /// Creates an empty response with no status written yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the written status, or `None` if nothing was written.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response into its parts, defaulting the status to 200.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        (self.status.unwrap_or(StatusCode::OK), self.headers, self.body)
    }
}

impl ResponseSink for BufferedResponse {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(bytes);
        Ok(())
    }
}

/// Writes a plain-text error response.
pub(crate) fn write_error(sink: &mut dyn ResponseSink, status: StatusCode, body: &str) {
    sink.set_header(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    sink.set_header(
        http::header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    sink.write_status(status);
    if let Err(e) = sink.write_body(body.as_bytes()) {
        tracing::error!(error = %e, "failed to write error response");
    }
}
