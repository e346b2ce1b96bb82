//! Unified error type.

use std::net::AddrParseError;

use crate::library::CatalogError;

/// The error type returned by cadenza's fallible start-up and serving
/// operations.
///
/// Request-level failures (404, 416, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: parsing the bind address, binding the port,
/// accepting connections, or loading the song catalog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
}
