//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Shared state rides along
//! in an [`http::Extensions`] map cloned into every request.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::Extensions;
use http::header::ALLOW;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Outcome of a route lookup.
pub(crate) enum Route {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path exists, but not for this method. Carries the methods that do
    /// match, for the `allow` header.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    state: Extensions,
    cors: bool,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), state: Extensions::new(), cors: true }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and `{*name}` for a catch-all
    /// tail; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use cadenza::{Method, Request, Response, Router};
    /// # async fn stream(_: Request) -> Response { Response::text("") }
    /// # async fn uploads(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/api/songs/{id}/stream", stream)
    ///     .on(Method::Get, "/uploads/{*path}",       uploads);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error rather than a runtime condition.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Shorthand for `on(Method::Get, ..)`.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    /// Attach shared state. Handlers read it back with
    /// [`Request::state`](crate::Request::state). One value per type; a
    /// second call with the same type replaces the first.
    pub fn with_state<T: Clone + Send + Sync + 'static>(mut self, state: T) -> Self {
        self.state.insert(state);
        self
    }

    /// Enable or disable permissive CORS headers and preflight handling.
    /// Enabled by default.
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    /// Route one request and produce its response. The server calls this
    /// for every request; tests may call it directly.
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();
        let span = tracing::info_span!("request", method = %parts.method, path = %parts.uri.path());
        let route = self.lookup(&parts.method, parts.uri.path());

        let fut = async move {
            if self.cors && middleware::cors::is_preflight(&parts) {
                let mut res = match route {
                    Route::NotFound => Response::status(Status::NotFound),
                    _ => Response::status(Status::NoContent),
                };
                middleware::cors::apply_preflight(&mut res);
                return res;
            }

            let mut res = match route {
                Route::Found(handler, params) => {
                    let req = Request::new(parts, body, params, self.state.clone());
                    handler.call(req).await
                }
                Route::MethodNotAllowed(allowed) => {
                    let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
                    let mut res = Response::error(Status::MethodNotAllowed, "Method not allowed");
                    if let Ok(v) = allow.parse() {
                        res.headers_mut().insert(ALLOW, v);
                    }
                    res
                }
                Route::NotFound => Response::error(Status::NotFound, "Not found"),
            };
            if self.cors {
                middleware::cors::apply(&mut res);
            }
            res
        };

        middleware::trace::instrument(span, fut).await
    }

    pub(crate) fn lookup(&self, method: &http::Method, path: &str) -> Route {
        if let Ok(m) = Method::try_from(method) {
            if let Some(matched) = self.routes.get(&m).and_then(|tree| tree.at(path).ok()) {
                let handler = Arc::clone(matched.value);
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Route::Found(handler, params);
            }
        }

        let allowed: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| self.routes.get(m).is_some_and(|tree| tree.at(path).is_ok()))
            .collect();
        if allowed.is_empty() {
            Route::NotFound
        } else {
            Route::MethodNotAllowed(allowed)
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    async fn echo_id(req: Request) -> String {
        req.param("id").unwrap_or("none").to_owned()
    }

    async fn read_state(req: Request) -> String {
        req.state::<Arc<String>>().map(|s| s.to_string()).unwrap_or_default()
    }

    fn get(path: &str) -> http::Request<Bytes> {
        http::Request::get(path).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn routes_path_params() {
        let app = Router::new().get("/songs/{id}", echo_id);
        let res = app.handle(get("/songs/42")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(&res.into_bytes().await.unwrap()[..], b"42");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let app = Router::new().get("/songs/{id}", echo_id);
        let res = app.handle(get("/albums/1")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_405_with_allow() {
        let app = Router::new().get("/songs/{id}", echo_id);
        let req = http::Request::delete("/songs/1").body(Bytes::new()).unwrap();
        let res = app.handle(req).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header(ALLOW), Some("GET"));
    }

    #[tokio::test]
    async fn state_is_visible_to_handlers() {
        let app = Router::new()
            .with_state(Arc::new("library".to_owned()))
            .get("/", read_state);
        let res = app.handle(get("/")).await;
        assert_eq!(&res.into_bytes().await.unwrap()[..], b"library");
    }

    #[tokio::test]
    async fn preflight_answers_without_calling_handler() {
        let app = Router::new().get("/songs/{id}", echo_id);
        let req = http::Request::options("/songs/1")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "GET")
            .body(Bytes::new())
            .unwrap();
        let res = app.handle(req).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }

    #[tokio::test]
    async fn cors_can_be_disabled() {
        let app = Router::new().cors(false).get("/songs/{id}", echo_id);
        let res = app.handle(get("/songs/1")).await;
        assert!(res.header("access-control-allow-origin").is_none());
    }
}
