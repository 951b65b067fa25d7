//! Handler trait and type erasure.
//!
//! # Two ways to write a handler
//!
//! Most handlers are plain async functions that return something
//! [`IntoResponse`](crate::IntoResponse):
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }
//! ```
//!
//! The blanket impl below turns that into a [`Handler`] by awaiting the
//! function and writing the result into the response sink.
//!
//! Handlers that need to drive the sink themselves (or wrap another handler,
//! like the instrumentation middleware) implement [`Handler`] directly:
//!
//! ```text
//! fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: Request) -> BoxFuture<'a>
//! ```
//!
//! The router stores handlers of different types side by side as
//! [`BoxedHandler`] (`Arc<dyn Handler>`). Per request that costs one virtual
//! call and one boxed future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::IntoResponse;
use crate::writer::ResponseWriter;

/// A heap-allocated, type-erased future borrowing the handler and the sink
/// for `'a`.
///
/// `Send` lets tokio move the future across worker threads.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Anything that can answer a request by writing into a [`ResponseWriter`].
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: Request) -> BoxFuture<'a>;
}

/// `async fn(Request) -> impl IntoResponse`
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, req: Request) -> BoxFuture<'a> {
        let fut = (self)(req);
        Box::pin(async move { fut.await.into_response().write_to(res) })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::writer::ResponseBuffer;

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    #[tokio::test]
    async fn async_fn_writes_its_response() {
        let handler: BoxedHandler = Arc::new(teapot);
        let mut buf = ResponseBuffer::new();
        handler.call(&mut buf, Request::new(Method::GET, "/")).await;
        assert_eq!(buf.status(), StatusCode::IM_A_TEAPOT);
    }
}
