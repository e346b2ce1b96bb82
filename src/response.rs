//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. Buffered bodies
//! (`json`, `text`) and streamed bodies (`stream`) share one body type, so
//! the server never needs to know which kind a handler produced.

use std::io;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use serde::Serialize;
use tracing::{error, warn};

use crate::status::Status;

/// Response body: either a buffered payload or a stream of chunks.
///
/// A stream that yields an `Err` makes hyper abort the connection, which is
/// how mid-stream I/O failures reach the client.
pub type Body = UnsyncBoxBody<Bytes, io::Error>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use cadenza::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NoContent);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use cadenza::{Response, Status};
/// use http::header::CONTENT_RANGE;
///
/// Response::builder()
///     .status(Status::RangeNotSatisfiable)
///     .header(CONTENT_RANGE, "bytes */1000")
///     .no_body();
/// ```
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self::builder().status(code).no_body()
    }

    /// `{"error": message}` with the given status, the shape every
    /// application-level failure takes on the wire.
    pub fn error(code: Status, message: &str) -> Self {
        let body = serde_json::json!({ "error": message });
        Self::builder().status(code).json(body.to_string())
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Header value as text, if present and visible ASCII.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Converts into the `http` crate's response, ready to hand to hyper.
    pub fn into_inner(self) -> http::Response<Body> {
        let mut res = http::Response::new(self.body);
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }

    /// Reads the whole body into memory. Meant for tests and small payloads;
    /// streamed media should be left to the server.
    pub async fn into_bytes(self) -> io::Result<Bytes> {
        Ok(self.body.collect().await?.to_bytes())
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method, so you always know what you're sending.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    /// Adds a header. Values that are not valid header text are dropped with
    /// a warning rather than failing the whole response.
    pub fn header(mut self, name: HeaderName, value: impl AsRef<str>) -> Self {
        match HeaderValue::from_str(value.as_ref()) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(e) => warn!(header = %name, "dropping invalid header value: {e}"),
        }
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.full(JSON, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.full(TEXT, Bytes::from(body.into()))
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::RangeNotSatisfiable`).
    pub fn no_body(self) -> Response {
        let body = Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync();
        Response { body, headers: self.headers, status: self.status }
    }

    /// Terminate with a streamed body of exactly `len` bytes.
    ///
    /// `content-length` is set from `len`; the stream is trusted to yield
    /// that many bytes. Chunks are forwarded as they arrive, so memory use is
    /// bounded by the producer's chunk size, not by `len`.
    pub fn stream<S>(mut self, content_type: &str, len: u64, chunks: S) -> Response
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        self = self.header(CONTENT_TYPE, content_type);
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        let body = StreamBody::new(chunks.map_ok(Frame::data)).boxed_unsync();
        Response { body, headers: self.headers, status: self.status }
    }

    fn full(mut self, content_type: &str, body: Bytes) -> Response {
        self = self.header(CONTENT_TYPE, content_type);
        let body = Full::new(body).map_err(|never| match never {}).boxed_unsync();
        Response { body, headers: self.headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

/// Typed JSON payload, serialised with `serde_json`.
///
/// ```rust
/// use cadenza::{Json, Request};
///
/// async fn index(_req: Request) -> Json<serde_json::Value> {
///     Json(serde_json::json!({ "message": "hello" }))
/// }
/// ```
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Response::json(bytes),
            Err(e) => {
                error!("failed to serialise response: {e}");
                Response::error(Status::InternalServerError, "Something went wrong!")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_body_is_json() {
        let res = Response::error(Status::NotFound, "Song not found");
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.header(CONTENT_TYPE), Some(JSON));
        let body = res.into_bytes().await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Song not found"}"#);
    }

    #[test]
    fn invalid_header_values_are_dropped() {
        let res = Response::builder()
            .header(HeaderName::from_static("x-bad"), "line\nbreak")
            .no_body();
        assert!(res.headers().get("x-bad").is_none());
    }

    #[tokio::test]
    async fn stream_sets_length_and_forwards_chunks() {
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"def")),
        ]);
        let res = Response::builder().stream("audio/mpeg", 6, chunks);
        assert_eq!(res.header(CONTENT_LENGTH), Some("6"));
        assert_eq!(res.header(CONTENT_TYPE), Some("audio/mpeg"));
        assert_eq!(&res.into_bytes().await.unwrap()[..], b"abcdef");
    }

    #[tokio::test]
    async fn stream_error_surfaces_on_collect() {
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(io::Error::other("disk gone")),
        ]);
        let res = Response::builder().stream("audio/mpeg", 6, chunks);
        assert!(res.into_bytes().await.is_err());
    }
}
