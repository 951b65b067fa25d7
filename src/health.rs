//! Built-in health-check handler.
//!
//! Register it like any other route. It is not special to the middleware:
//! requests to it are counted and timed like everything else.
//!
//! ```rust,no_run
//! use httpmeter::{Router, health};
//!
//! let app = Router::new().get("/", health::health);
//! ```

use http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::{Request, Response};

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    message: &'static str,
}

/// Returns `200 OK` with `{"status":"ok","message":"service is healthy"}`.
///
/// If the body cannot be serialized the caller gets a `500` with a plain-text
/// error instead.
pub async fn health(_req: Request) -> Response {
    let body = HealthStatus { status: "ok", message: "service is healthy" };
    match serde_json::to_vec(&body) {
        Ok(bytes) => Response::json(bytes),
        Err(e) => {
            error!("failed to encode health response: {e}");
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .text("failed to encode response")
        }
    }
}

#[cfg(test)]
mod tests {
    use http::Method;
    use http::header::CONTENT_TYPE;

    use super::*;
    use crate::handler::Handler;
    use crate::metrics::MetricRegistry;
    use crate::middleware::instrument;
    use crate::router::Router;
    use crate::writer::ResponseBuffer;

    #[tokio::test]
    async fn reports_healthy() {
        let metrics = MetricRegistry::new().unwrap();
        let app = instrument(metrics.clone(), Router::new().get("/", health));

        let mut buf = ResponseBuffer::new();
        app.call(&mut buf, Request::new(Method::GET, "/")).await;

        assert_eq!(buf.status(), StatusCode::OK);
        assert_eq!(buf.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(buf.body(), br#"{"status":"ok","message":"service is healthy"}"#);
        assert_eq!(metrics.request_count("/", "GET", "200"), 1);
    }
}
