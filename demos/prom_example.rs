//! Instrumented service with a health endpoint and a Prometheus scrape target.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example prom_example
//!
//! Try:
//!   curl http://localhost:2112/
//!   curl http://localhost:2112/test1
//!   curl -X POST http://localhost:2112/test2
//!   curl http://localhost:2112/nope
//!   curl http://localhost:2112/metrics

use httpmeter::{MetricRegistry, Router, Server, health, instrument};

#[tokio::main]
async fn main() -> Result<(), httpmeter::Error> {
    tracing_subscriber::fmt::init();

    // A name collision here stops the process before it binds.
    let metrics = MetricRegistry::new()?;

    let app = Router::new()
        .any("/", health::health)
        .any("/test1", health::health)
        .any("/test2", health::health)
        .any("/test3", health::health)
        .get("/metrics", metrics.exposition())
        // Any other path is answered as healthy too.
        .fallback(health::health);

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:2112".to_owned());

    Server::bind(&addr).serve(instrument(metrics, app)).await
}
