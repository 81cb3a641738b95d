//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup, plus a single fallback
//! handler for everything that does not match.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registrations return `self` so they chain.
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
    /// Static segments win over parameters, so `/prendas/nombre/{nombre}`
    /// and `/prendas/{codigo}` coexist.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with an existing route.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Handler for requests no route matches. Without one, they get a bare 404.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &http::Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let method = Method::try_from(method).ok()?;
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        // Parameters arrive percent-encoded; undecodable ones are kept raw.
        let params = matched.params.iter()
            .map(|(k, v)| {
                let value = urlencoding::decode(v).map_or_else(|_| v.to_owned(), |d| d.into_owned());
                (k.to_owned(), value)
            })
            .collect();
        Some((handler, params))
    }

    /// Routes one buffered request and produces its response.
    pub(crate) async fn handle(&self, mut req: Request) -> Response {
        let span = middleware::trace::start(&req);
        let response = match self.lookup(&req.method, &req.path) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None => match &self.fallback {
                Some(handler) => handler.call(req).await,
                None => Response::status(Status::NotFound),
            },
        };
        span.finish(&response);
        response
    }

    /// Runs a single request through the router without a socket.
    ///
    /// The query string is ignored, as it is by the server.
    pub async fn oneshot(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();
        self.handle(Request::new(parts.method, path, body)).await
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok(_req: Request) -> Response { Response::text("ok") }
    async fn missing(_req: Request) -> Response {
        Response::builder().status(Status::NotFound).text("missing")
    }

    fn request(method: http::Method, path: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn static_segment_beats_parameter() {
        let router = Router::new()
            .get("/prendas/{codigo}", ok)
            .get("/prendas/nombre/{nombre}", ok);

        let (_, params) = router.lookup(&http::Method::GET, "/prendas/nombre/camisa").unwrap();
        assert_eq!(params.get("nombre").map(String::as_str), Some("camisa"));

        let (_, params) = router.lookup(&http::Method::GET, "/prendas/12").unwrap();
        assert_eq!(params.get("codigo").map(String::as_str), Some("12"));
    }

    #[test]
    fn parameters_are_percent_decoded() {
        let router = Router::new().get("/prendas/nombre/{nombre}", ok);
        let (_, params) = router
            .lookup(&http::Method::GET, "/prendas/nombre/Camisa%20Azul")
            .unwrap();
        assert_eq!(params["nombre"], "Camisa Azul");

        let (_, params) = router.lookup(&http::Method::GET, "/prendas/nombre/%FF").unwrap();
        assert_eq!(params["nombre"], "%FF");
    }

    #[test]
    fn lookup_is_per_method() {
        let router = Router::new().delete("/prendas/{codigo}", ok);
        assert!(router.lookup(&http::Method::GET, "/prendas/1").is_none());
        assert!(router.lookup(&http::Method::DELETE, "/prendas/1").is_some());
    }

    #[tokio::test]
    async fn unmatched_requests_reach_fallback() {
        let router = Router::new().get("/", ok).fallback(missing);
        let response = router.oneshot(request(http::Method::POST, "/nada")).await;
        assert_eq!(response.status_code(), Status::NotFound);
        assert_eq!(response.body(), b"missing");
    }

    #[tokio::test]
    async fn no_fallback_means_bare_404() {
        let router = Router::new().get("/", ok);
        let response = router.oneshot(request(http::Method::GET, "/x?y=1")).await;
        assert_eq!(response.status_code(), Status::NotFound);
        assert!(response.body().is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .get("/prendas/{codigo}", ok)
            .get("/prendas/{nombre}", ok);
    }
}
