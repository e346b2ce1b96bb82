//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use cadenza::{Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NoContent);
//!
//! // return Status directly from a handler and it is wrapped for you
//! async fn gone(_req: cadenza::Request) -> Status {
//!     Status::NotFound
//! }
//! ```

use http::StatusCode;

/// The status codes a media backend actually answers with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    NoContent,           // 204
    PartialContent,      // 206

    // ── 4xx Client Error ──────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404
    MethodNotAllowed,    // 405
    PayloadTooLarge,     // 413
    RangeNotSatisfiable, // 416

    // ── 5xx Server Error ──────────────────────────────────────────────────────
    InternalServerError, // 500
    ServiceUnavailable,  // 503
}

impl From<Status> for StatusCode {
    fn from(s: Status) -> StatusCode {
        match s {
            Status::Ok                  => StatusCode::OK,
            Status::NoContent           => StatusCode::NO_CONTENT,
            Status::PartialContent      => StatusCode::PARTIAL_CONTENT,
            Status::BadRequest          => StatusCode::BAD_REQUEST,
            Status::NotFound            => StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => StatusCode::METHOD_NOT_ALLOWED,
            Status::PayloadTooLarge     => StatusCode::PAYLOAD_TOO_LARGE,
            Status::RangeNotSatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
            Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Status::ServiceUnavailable  => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
