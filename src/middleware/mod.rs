//! Request instrumentation.
//!
//! [`instrument`] wraps any [`Handler`] and records, for every request it
//! sees, one increment of `http_requests_total` and one observation of
//! `http_request_duration_seconds`, both labelled with the raw path, the raw
//! method, and the status the handler wrote.
//!
//! ```rust,no_run
//! use httpmeter::{MetricRegistry, Router, Server, health, instrument};
//!
//! # async fn run() -> Result<(), httpmeter::Error> {
//! let metrics = MetricRegistry::new()?;
//! let app = Router::new()
//!     .get("/", health::health)
//!     .get("/metrics", metrics.exposition());
//!
//! Server::bind("0.0.0.0:2112").serve(instrument(metrics, app)).await
//! # }
//! ```
//!
//! The wrapped handler's status and body reach the client untouched. Error
//! statuses, 5xx included, are recorded like any other.

mod capture;

use std::time::{Duration, Instant};

use http::StatusCode;
use tracing::{debug, warn};

use crate::handler::{BoxFuture, Handler};
use crate::metrics::MetricRegistry;
use crate::request::Request;
use crate::writer::ResponseWriter;

pub use capture::CapturedResponse;

/// Wraps `handler` so every call through it is recorded into `metrics`.
pub fn instrument<H: Handler>(metrics: MetricRegistry, handler: H) -> Instrumented<H> {
    Instrumented { inner: handler, metrics, timeout: None }
}

/// A [`Handler`] that records request count and latency around another one.
/// Built by [`instrument`].
pub struct Instrumented<H> {
    inner: H,
    metrics: MetricRegistry,
    timeout: Option<Duration>,
}

impl<H> Instrumented<H> {
    /// Gives the wrapped handler at most `limit` to finish.
    ///
    /// On expiry the handler future is dropped. If it had not written a status
    /// yet, `504 Gateway Timeout` is written and recorded; otherwise the status
    /// it already committed is recorded.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

impl<H: Handler> Handler for Instrumented<H> {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: Request) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            let path = req.path().to_owned();
            let method = req.method().to_owned();

            let mut captured = CapturedResponse::new(res);
            match self.timeout {
                None => self.inner.call(&mut captured, req).await,
                Some(limit) => {
                    let outcome =
                        tokio::time::timeout(limit, self.inner.call(&mut captured, req)).await;
                    if outcome.is_err() {
                        warn!(%path, %method, ?limit, "handler timed out");
                        if !captured.is_committed() {
                            captured.write_status(StatusCode::GATEWAY_TIMEOUT);
                        }
                    }
                }
            }

            let elapsed = start.elapsed().as_secs_f64();
            let status = captured.status();

            self.metrics.increment_request(&path, &method, status.as_str());
            self.metrics.observe_latency(&path, &method, status.as_str(), elapsed);

            debug!(%path, %method, status = status.as_u16(), elapsed, "request observed");
        })
    }
}
