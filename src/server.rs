//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`, so no new connections are made.
//! 2. Letting every in-flight request run to completion, then closing its
//!    connection. Idle keep-alive connections are closed right away.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Requests still in flight when the signal arrives finish normally, so they
//! are still counted by the instrumentation middleware.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::writer::ResponseBuffer;

enum Listen {
    Addr(SocketAddr),
    Bound(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listen: Listen,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use httpmeter::Server;
    /// let server = Server::bind("0.0.0.0:2112");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { listen: Listen::Addr(addr) }
    }

    /// Serves on a listener that is already bound, e.g. to an ephemeral port.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listen: Listen::Bound(listener) }
    }

    /// Starts accepting connections and dispatching them to `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, handler: impl Handler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `signal`
    /// resolves instead of waiting for SIGTERM / Ctrl-C.
    pub async fn serve_with_shutdown(
        self,
        handler: impl Handler,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = match self.listen {
            Listen::Addr(addr) => TcpListener::bind(addr).await?,
            Listen::Bound(listener) => listener,
        };
        let addr = listener.local_addr()?;

        // Shared by every connection task without copying the routing table.
        let handler = Arc::new(handler);

        info!(%addr, "httpmeter listening");

        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
        let builder = ConnBuilder::new(TokioExecutor::new());
        // Lets shutdown tell idle keep-alive connections to close.
        let graceful = GracefulShutdown::new();
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting even when
                // more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let handler = Arc::clone(&handler);
                        async move { dispatch(handler, req).await }
                    });
                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // In-flight requests finish; idle connections are closed.
        graceful.shutdown().await;
        while tasks.join_next().await.is_some() {}

        info!("httpmeter stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Collects the body, runs the handler against a fresh [`ResponseBuffer`],
/// and hands the result to hyper.
///
/// Never fails: a body that cannot be read becomes a `400`.
async fn dispatch<H: Handler>(
    handler: Arc<H>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let mut out = ResponseBuffer::new();

    match body.collect().await {
        Ok(collected) => {
            let request = Request::from_parts(parts, collected.to_bytes());
            handler.call(&mut out, request).await;
        }
        Err(e) => {
            warn!(path = parts.uri.path(), "failed to read request body: {e}");
            Response::status(http::StatusCode::BAD_REQUEST).write_to(&mut out);
        }
    }

    Ok(out.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
