//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is itself a
//! [`Handler`], so the whole routing table can be wrapped by a middleware in
//! one call.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::writer::ResponseWriter;

/// Methods a route registered with [`Router::any`] answers.
const ANY: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// directly or wrapped in [`instrument`](crate::instrument).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with an existing route.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, Arc::new(handler))
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    /// Register one handler for every common method on `path`.
    pub fn any(mut self, path: &str, handler: impl Handler) -> Self {
        let handler: BoxedHandler = Arc::new(handler);
        for method in ANY {
            self = self.add(method, path, Arc::clone(&handler));
        }
        self
    }

    /// Answer every request no route matches, whatever its method, instead of
    /// returning `404` / `405`.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(&BoxedHandler, HashMap<String, String>)> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value, params))
    }

    fn path_exists(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Handler for Router {
    fn call<'a>(&'a self, res: &'a mut dyn ResponseWriter, mut req: Request) -> BoxFuture<'a> {
        match (self.lookup(req.http_method(), req.path()), &self.fallback) {
            (Some((handler, params)), _) => {
                req.set_params(params);
                handler.call(res, req)
            }
            (None, Some(fallback)) => fallback.call(res, req),
            (None, None) => {
                let status = if self.path_exists(req.path()) {
                    StatusCode::METHOD_NOT_ALLOWED
                } else {
                    StatusCode::NOT_FOUND
                };
                Box::pin(async move { Response::status(status).write_to(res) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ResponseBuffer;

    async fn echo_id(req: Request) -> String {
        req.param("id").unwrap_or("none").to_owned()
    }

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    async fn run(router: &Router, method: Method, path: &str) -> ResponseBuffer {
        let mut buf = ResponseBuffer::new();
        router.call(&mut buf, Request::new(method, path)).await;
        buf
    }

    #[tokio::test]
    async fn resolves_params() {
        let router = Router::new().get("/users/{id}", echo_id);
        let buf = run(&router, Method::GET, "/users/42").await;
        assert_eq!(buf.status(), StatusCode::OK);
        assert_eq!(buf.body(), b"42");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let router = Router::new().get("/", ok);
        let buf = run(&router, Method::GET, "/missing").await;
        assert_eq!(buf.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_not_allowed() {
        let router = Router::new().get("/", ok);
        let buf = run(&router, Method::POST, "/").await;
        assert_eq!(buf.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn fallback_answers_unmatched_requests() {
        let router = Router::new().get("/known", echo_id).fallback(ok);
        for (method, path) in [(Method::GET, "/nope"), (Method::POST, "/known")] {
            let buf = run(&router, method, path).await;
            assert_eq!(buf.status(), StatusCode::OK);
            assert_eq!(buf.body(), b"ok");
        }
    }

    #[tokio::test]
    async fn post_sees_body_and_headers() {
        async fn echo(req: Request) -> String {
            let tag = req.header("X-Tag").unwrap_or("-");
            format!("{tag}:{}", String::from_utf8_lossy(req.body()))
        }

        let router = Router::new().post("/echo", echo);
        let mut req = Request::new(Method::POST, "/echo").with_body("payload");
        req.headers_mut().insert("x-tag", http::HeaderValue::from_static("t1"));

        let mut buf = ResponseBuffer::new();
        router.call(&mut buf, req).await;

        assert_eq!(buf.body(), b"t1:payload");
    }

    #[tokio::test]
    async fn any_answers_every_common_method() {
        let router = Router::new().any("/", ok);
        for method in [Method::GET, Method::POST, Method::DELETE] {
            let buf = run(&router, method, "/").await;
            assert_eq!(buf.body(), b"ok");
        }
    }
}
