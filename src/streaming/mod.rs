//! Byte-range file streaming.
//!
//! [`serve`] answers one `GET` for a stored media file:
//!
//! | Request                   | Response                                        |
//! |---------------------------|-------------------------------------------------|
//! | no `Range`                | `200`, whole file                               |
//! | satisfiable single span   | `206`, `Content-Range: bytes s-e/size`          |
//! | anything else with `Range`| `416`, `Content-Range: bytes */size`            |
//! | missing / non-regular file| `404`                                           |
//!
//! The file is read in `chunk_size` pieces as hyper polls the body, so memory
//! use per stream is bounded by one chunk. The body owns the file handle;
//! hyper drops the body when the response completes or the client goes away,
//! which closes the file on every exit path.

mod range;

use std::io::{self, ErrorKind, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use http::HeaderMap;
use http::header::{ACCEPT_RANGES, CONTENT_RANGE, RANGE};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

pub use range::{ByteRange, RangeError, unsatisfied_content_range};

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Default read size per body chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Failure to start a stream. Once headers are sent, failures abort the
/// connection instead and are only logged.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("media file not found")]
    NotFound,

    #[error("range not satisfiable for {size} bytes: {source}")]
    InvalidRange {
        size: u64,
        #[source]
        source: RangeError,
    },

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

impl IntoResponse for StreamError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => Response::error(Status::NotFound, "Not found"),
            Self::InvalidRange { size, .. } => Response::builder()
                .status(Status::RangeNotSatisfiable)
                .header(CONTENT_RANGE, unsatisfied_content_range(size))
                .no_body(),
            Self::Io(e) => {
                error!("failed to open media file: {e}");
                Response::error(Status::InternalServerError, "Error streaming file")
            }
        }
    }
}

/// Streams `path` as `content_type`, honouring an optional `Range` header.
pub async fn serve(
    path: &Path,
    range: Option<&str>,
    content_type: &str,
    chunk_size: usize,
) -> Result<Response, StreamError> {
    stream_file(path, range.map(Ok), content_type, chunk_size).await
}

/// Like [`serve`], reading `Range` straight from the request headers.
///
/// A `Range` value that is not visible ASCII is malformed and gets `416`
/// like any other unparseable range, never the whole file.
pub async fn serve_request(
    path: &Path,
    headers: &HeaderMap,
    content_type: &str,
    chunk_size: usize,
) -> Result<Response, StreamError> {
    let range = headers.get(RANGE).map(|value| {
        value
            .to_str()
            .map_err(|_| RangeError::Malformed(String::from_utf8_lossy(value.as_bytes()).into_owned()))
    });
    stream_file(path, range, content_type, chunk_size).await
}

async fn stream_file(
    path: &Path,
    range: Option<Result<&str, RangeError>>,
    content_type: &str,
    chunk_size: usize,
) -> Result<Response, StreamError> {
    let mut file = File::open(path).await.map_err(open_error)?;
    let meta = file.metadata().await.map_err(open_error)?;
    if !meta.is_file() {
        return Err(StreamError::NotFound);
    }
    let size = meta.len();

    let Some(range) = range else {
        debug!(path = %path.display(), size, "streaming whole file");
        let body = chunks(file, size, chunk_size, path);
        return Ok(Response::builder()
            .header(ACCEPT_RANGES, "bytes")
            .stream(content_type, size, body));
    };

    let span = range.and_then(|header| ByteRange::parse(header, size)).map_err(|source| {
        warn!(path = %path.display(), size, "rejecting range: {source}");
        StreamError::InvalidRange { size, source }
    })?;

    if span.start() > 0 {
        file.seek(SeekFrom::Start(span.start())).await?;
    }
    debug!(path = %path.display(), %span, size, "streaming partial content");

    let body = chunks(file, span.len(), chunk_size, path);
    Ok(Response::builder()
        .status(Status::PartialContent)
        .header(CONTENT_RANGE, span.content_range(size))
        .header(ACCEPT_RANGES, "bytes")
        .stream(content_type, span.len(), body))
}

/// Reads at most `len` bytes from the file's current position. Read errors
/// are logged here and then end the body with an error, which aborts the
/// connection; nothing is retried.
fn chunks(
    file: File,
    len: u64,
    chunk_size: usize,
    path: &Path,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    let path = path.to_owned();
    ReaderStream::with_capacity(file.take(len), chunk_size.max(1)).inspect_err(move |e| {
        error!(path = %path.display(), "aborting stream: {e}");
    })
}

// Anything that stops us from opening the file for reading counts as absent.
fn open_error(e: io::Error) -> StreamError {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => StreamError::NotFound,
        _ => StreamError::Io(e),
    }
}
