//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Most handlers never touch a [`ResponseWriter`] directly. They build a
//! [`Response`] and return it; the handler glue writes it into the sink.

use http::header::{CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::writer::ResponseWriter;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use httpmeter::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use httpmeter::Response;
/// use http::{HeaderValue, StatusCode, header::LOCATION};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header(LOCATION, HeaderValue::from_static("/users/42"))
///     .json(br#"{"id":42}"#.to_vec());
/// ```
pub struct Response {
    body: Vec<u8>,
    headers: HeaderMap,
    status: StatusCode,
}

impl Response {
    /// `200 OK` with `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` with `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { body: Vec::new(), headers: HeaderMap::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    /// Writes headers, then status, then body into `res`.
    pub fn write_to(self, res: &mut dyn ResponseWriter) {
        res.headers_mut().extend(self.headers);
        res.write_status(self.status);
        if !self.body.is_empty() {
            res.write(&self.body);
        }
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into().into_bytes())
    }

    /// Terminate with an arbitrary content type.
    pub fn bytes(self, content_type: &'static str, body: Vec<u8>) -> Response {
        self.finish(content_type, body)
    }

    fn finish(mut self, content_type: &'static str, body: Vec<u8>) -> Response {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Response { body, headers: self.headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a bare status from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ResponseBuffer;

    #[test]
    fn builder_writes_status_headers_and_body() {
        let mut buf = ResponseBuffer::new();
        Response::builder()
            .status(StatusCode::CREATED)
            .header(http::header::LOCATION, HeaderValue::from_static("/users/99"))
            .json(b"{}".to_vec())
            .write_to(&mut buf);

        assert_eq!(buf.status(), StatusCode::CREATED);
        assert_eq!(buf.headers()[CONTENT_TYPE], JSON);
        assert_eq!(buf.headers()[http::header::LOCATION], "/users/99");
        assert_eq!(buf.body(), b"{}");
    }

    #[test]
    fn bytes_sets_the_given_content_type() {
        let mut buf = ResponseBuffer::new();
        Response::builder()
            .bytes("application/xml", b"<ok/>".to_vec())
            .write_to(&mut buf);

        assert_eq!(buf.status(), StatusCode::OK);
        assert_eq!(buf.headers()[CONTENT_TYPE], "application/xml");
        assert_eq!(buf.body(), b"<ok/>");
    }

    #[test]
    fn bare_status_has_no_body() {
        let mut buf = ResponseBuffer::new();
        StatusCode::NO_CONTENT.into_response().write_to(&mut buf);
        assert_eq!(buf.status(), StatusCode::NO_CONTENT);
        assert!(buf.body().is_empty());
    }
}
