//! Permissive CORS.
//!
//! Every response may be read by any origin. Preflight requests are answered
//! directly by the router without reaching a handler.

use http::HeaderValue;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD,
};

use crate::response::Response;

const ALLOW_METHODS: &str = "GET, HEAD, PUT, PATCH, POST, DELETE";
const ALLOW_HEADERS: &str = "authorization, content-type, range";
// Players need these to seek and to show progress.
const EXPOSE_HEADERS: &str = "accept-ranges, content-length, content-range";

/// A preflight is an `OPTIONS` request announcing the method it intends to use.
pub fn is_preflight(parts: &http::request::Parts) -> bool {
    parts.method == http::Method::OPTIONS
        && parts.headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// Adds the headers every cross-origin response needs.
pub fn apply(res: &mut Response) {
    let headers = res.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static(EXPOSE_HEADERS));
}

/// Adds the headers that answer a preflight.
pub fn apply_preflight(res: &mut Response) {
    apply(res);
    let headers = res.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
}
