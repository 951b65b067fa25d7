//! The request collectors and their registration.
//!
//! Two collectors, one label set:
//!
//! | Name | Type | Labels |
//! |---|---|---|
//! | `http_requests_total` | counter | `path`, `method`, `status` |
//! | `http_request_duration_seconds` | histogram | `path`, `method`, `status` |
//!
//! Build a [`MetricRegistry`] once at startup, before the server accepts
//! traffic, and hand clones of it to whatever records or exposes metrics.
//! Clones share the same collectors.
//!
//! ```rust
//! use httpmeter::MetricRegistry;
//!
//! let metrics = MetricRegistry::new().expect("collectors register exactly once");
//! metrics.increment_request("/", "GET", "200");
//! assert_eq!(metrics.request_count("/", "GET", "200"), 1);
//! ```
//!
//! `path` is the raw request path, not a route template. Every distinct path
//! a client sends becomes its own series, so routes with path parameters
//! (`/users/123`) grow cardinality without bound.

use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::writer::ResponseWriter;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

const LABELS: [&str; 3] = ["path", "method", "status"];

/// Request counter and latency histogram, registered with a
/// [`prometheus::Registry`].
#[derive(Clone)]
pub struct MetricRegistry {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
}

impl MetricRegistry {
    /// Creates both collectors with default latency buckets and registers them
    /// with a fresh registry.
    pub fn new() -> Result<Self, Error> {
        Self::builder().register(Registry::new())
    }

    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder { buckets: prometheus::DEFAULT_BUCKETS.to_vec() }
    }

    pub fn increment_request(&self, path: &str, method: &str, status: &str) {
        self.requests.with_label_values(&[path, method, status]).inc();
    }

    pub fn observe_latency(&self, path: &str, method: &str, status: &str, seconds: f64) {
        self.latency.with_label_values(&[path, method, status]).observe(seconds);
    }

    /// Current counter value for one label-tuple. Zero if never observed.
    pub fn request_count(&self, path: &str, method: &str, status: &str) -> u64 {
        self.requests.with_label_values(&[path, method, status]).get()
    }

    /// Number of latency observations for one label-tuple.
    pub fn latency_count(&self, path: &str, method: &str, status: &str) -> u64 {
        self.latency.with_label_values(&[path, method, status]).get_sample_count()
    }

    /// Sum of observed latencies, in seconds, for one label-tuple.
    pub fn latency_sum(&self, path: &str, method: &str, status: &str) -> f64 {
        self.latency.with_label_values(&[path, method, status]).get_sample_sum()
    }

    /// The registry the collectors live in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A handler serving the registry in Prometheus text format. Mount it at
    /// `/metrics`.
    pub fn exposition(&self) -> Exposition {
        Exposition { registry: self.registry.clone() }
    }

    /// Renders every registered collector in the text exposition format.
    pub fn render(&self) -> Result<String, Error> {
        render(&self.registry)
    }
}

/// Configuration for [`MetricRegistry`]. Obtain via [`MetricRegistry::builder`].
pub struct MetricRegistryBuilder {
    buckets: Vec<f64>,
}

impl MetricRegistryBuilder {
    /// Latency histogram bucket upper bounds, in seconds.
    pub fn buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = buckets;
        self
    }

    /// Creates both collectors and registers them with `registry`.
    ///
    /// Fails with [`prometheus::Error::AlreadyReg`] if either name is taken.
    /// Registration is all or nothing: on failure neither collector is left
    /// in `registry`.
    ///
    /// Pass `prometheus::default_registry().clone()` to share the
    /// process-global registry.
    pub fn register(self, registry: Registry) -> Result<MetricRegistry, Error> {
        let requests = IntCounterVec::new(
            Opts::new(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
            &LABELS,
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(
                HTTP_REQUEST_DURATION_SECONDS,
                "Histogram of latencies for HTTP requests.",
            )
            .buckets(self.buckets),
            &LABELS,
        )?;

        registry.register(Box::new(requests.clone()))?;
        if let Err(e) = registry.register(Box::new(latency.clone())) {
            // Leave the registry as it was so a retry is not blocked by the counter.
            if let Err(unreg) = registry.unregister(Box::new(requests)) {
                warn!("failed to roll back {HTTP_REQUESTS_TOTAL}: {unreg}");
            }
            return Err(e.into());
        }
        debug!("request collectors registered");

        Ok(MetricRegistry { registry, requests, latency })
    }
}

fn render(registry: &Registry) -> Result<String, Error> {
    let families = registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Metrics(prometheus::Error::Msg(e.to_string())))
}

/// The `/metrics` endpoint. See [`MetricRegistry::exposition`].
pub struct Exposition {
    registry: Registry,
}

impl Handler for Exposition {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, _req: Request) -> BoxFuture<'a> {
        Box::pin(async move {
            match render(&self.registry) {
                Ok(text) => {
                    res.headers_mut().insert(
                        CONTENT_TYPE,
                        HeaderValue::from_static(prometheus::TEXT_FORMAT),
                    );
                    res.write_status(StatusCode::OK);
                    res.write(text.as_bytes());
                }
                Err(e) => {
                    error!("failed to encode metrics: {e}");
                    Response::builder()
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .text("failed to encode metrics")
                        .write_to(res);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::writer::ResponseBuffer;

    #[test]
    fn registers_both_collectors() {
        let metrics = MetricRegistry::new().unwrap();
        metrics.increment_request("/", "GET", "200");
        metrics.observe_latency("/", "GET", "200", 0.01);

        let names: Vec<String> = metrics.registry().gather()
            .iter()
            .map(|family| family.get_name().to_owned())
            .collect();
        assert!(names.contains(&HTTP_REQUESTS_TOTAL.to_owned()));
        assert!(names.contains(&HTTP_REQUEST_DURATION_SECONDS.to_owned()));
    }

    #[test]
    fn double_registration_fails() {
        let registry = Registry::new();
        MetricRegistry::builder().register(registry.clone()).unwrap();

        let err = MetricRegistry::builder().register(registry).err().unwrap();
        assert!(err.is_already_registered());
    }

    #[test]
    fn failed_registration_leaves_registry_untouched() {
        let registry = Registry::new();
        let taken = HistogramVec::new(
            HistogramOpts::new(
                HTTP_REQUEST_DURATION_SECONDS,
                "Histogram of latencies for HTTP requests.",
            ),
            &LABELS,
        )
        .unwrap();
        registry.register(Box::new(taken.clone())).unwrap();

        let err = MetricRegistry::builder().register(registry.clone()).err().unwrap();
        assert!(err.is_already_registered());

        registry.unregister(Box::new(taken)).unwrap();
        MetricRegistry::builder().register(registry).unwrap();
    }

    #[test]
    fn labels_are_isolated() {
        let metrics = MetricRegistry::new().unwrap();
        metrics.increment_request("/a", "GET", "200");
        metrics.increment_request("/a", "GET", "200");

        assert_eq!(metrics.request_count("/a", "GET", "200"), 2);
        assert_eq!(metrics.request_count("/b", "GET", "200"), 0);
    }

    #[test]
    fn custom_buckets_are_used() {
        let metrics = MetricRegistry::builder()
            .buckets(vec![0.1, 1.0])
            .register(Registry::new())
            .unwrap();
        metrics.observe_latency("/", "GET", "200", 0.5);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"le="0.1""#));
        assert!(text.contains(r#"le="1""#));
        assert!(!text.contains(r#"le="0.005""#));
    }

    #[tokio::test]
    async fn exposition_renders_text_format() {
        let metrics = MetricRegistry::new().unwrap();
        metrics.increment_request("/test1", "GET", "404");
        metrics.observe_latency("/test1", "GET", "404", 0.002);

        let mut buf = ResponseBuffer::new();
        metrics.exposition().call(&mut buf, Request::new(Method::GET, "/metrics")).await;

        assert_eq!(buf.status(), StatusCode::OK);
        assert_eq!(buf.headers()[CONTENT_TYPE], prometheus::TEXT_FORMAT);

        let body = std::str::from_utf8(buf.body()).unwrap();
        assert!(body.contains("# HELP http_requests_total Total number of HTTP requests"));
        assert!(body.contains("# TYPE http_requests_total counter"));
        assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(body.contains(r#"http_requests_total{method="GET",path="/test1",status="404"} 1"#));
        assert!(body.contains(
            r#"http_request_duration_seconds_count{method="GET",path="/test1",status="404"} 1"#
        ));
    }
}
