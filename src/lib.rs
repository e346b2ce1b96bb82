//! # cadenza
//!
//! A small media-library backend: song metadata lookup plus HTTP streaming
//! of the stored audio with single-span byte-range support, so browser and
//! mobile players can seek.
//!
//! The pieces:
//!
//! - [`streaming`]: the range streamer (`200` / `206` / `416` / `404`),
//!   chunked reads, file handle released whenever the body is dropped
//! - [`library`]: song metadata ([`library::MediaStore`]) and the media root
//! - [`routes`]: the HTTP surface wired onto a [`Router`]
//! - a thin hyper-based framework underneath: [`Router`] (radix-tree routing
//!   via [`matchit`]), [`Request`], [`Response`], [`Server`] with graceful
//!   shutdown, and [`middleware`] for CORS and request tracing
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cadenza::{Config, Library, Server, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cadenza::Error> {
//!     let config = Config::default();
//!     let library = Library::open(&config).await?;
//!
//!     Server::bind(&config.addr())?
//!         .serve(routes::app(library))
//!         .await
//! }
//! ```
//!
//! Out of scope: accounts and authentication, uploads, and editing song
//! metadata. The catalog is read-only to this service.

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod library;
pub mod middleware;
pub mod mime;
pub mod routes;
pub mod streaming;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use library::Library;
pub use method::Method;
pub use request::Request;
pub use response::{Body, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
