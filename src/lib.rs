//! # httpmeter
//!
//! Request instrumentation for HTTP services. Wrap a handler, get Prometheus
//! request counts and latency histograms for every request it serves. The
//! handler itself does not change.
//!
//! ## What gets recorded
//!
//! For each request, after the wrapped handler returns:
//!
//! - `http_requests_total{path, method, status}` goes up by one
//! - `http_request_duration_seconds{path, method, status}` gets one observation
//!
//! `status` is the first status the handler wrote, or `200` if it only wrote a
//! body. `path` and `method` are taken verbatim from the request.
//!
//! ## How
//!
//! Handlers write into a [`ResponseWriter`]. [`instrument`] slips a
//! [`CapturedResponse`](middleware::CapturedResponse) between the handler and
//! the real sink: every call passes straight through and the status is
//! noted on the way. The collectors live in a [`MetricRegistry`] you build
//! once at startup and pass in explicitly; there is no global state.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use httpmeter::{MetricRegistry, Request, Response, Router, Server, health, instrument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), httpmeter::Error> {
//!     // Registration collisions fail here, before anything is served.
//!     let metrics = MetricRegistry::new()?;
//!
//!     let app = Router::new()
//!         .get("/", health::health)
//!         .get("/users/{id}", get_user)
//!         .get("/metrics", metrics.exposition());
//!
//!     Server::bind("0.0.0.0:2112").serve(instrument(metrics, app)).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod metrics;
mod request;
mod response;
mod router;
mod server;
mod writer;

pub mod health;
pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use metrics::{
    Exposition, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL, MetricRegistry,
    MetricRegistryBuilder,
};
pub use middleware::{Instrumented, instrument};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use writer::{ResponseBuffer, ResponseWriter};
