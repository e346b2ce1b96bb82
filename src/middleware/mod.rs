//! Middleware layer.
//!
//! Cross-cutting concerns applied by [`Router::handle`](crate::Router::handle)
//! around every handler call:
//!
//! - [`trace`]: per-request span with method and path, plus a completion
//!   event carrying status and latency
//! - [`cors`]: permissive cross-origin headers and preflight answers, so a
//!   browser player served from another origin can fetch audio

pub mod cors;
pub mod trace;
