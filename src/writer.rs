//! The response sink every handler writes into.
//!
//! A handler does not return bytes to the server directly. It is handed a
//! `&mut dyn ResponseWriter` and pushes a status, headers, and body chunks
//! through it. That indirection is what lets a middleware slip a thin proxy
//! in front of the real sink and observe what the handler wrote.
//!
//! HTTP semantics apply: the first status written is the one the client sees.
//! Writing body bytes before any status commits `200 OK`.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

/// Capability interface for an outbound HTTP response.
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the response status. Only the first call is authoritative.
    fn write_status(&mut self, status: StatusCode);

    /// Appends a chunk to the response body, committing `200 OK` if no status
    /// has been written yet.
    fn write(&mut self, chunk: &[u8]);
}

/// The server's real sink: collects one response and hands it to hyper once
/// the handler returns.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, or `200 OK` if nothing was committed.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl ResponseWriter for ResponseBuffer {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => warn!(
                committed = committed.as_u16(),
                ignored = status.as_u16(),
                "superfluous status write"
            ),
        }
    }

    fn write(&mut self, chunk: &[u8]) {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(chunk);
    }
}
