//! Static serving of the media root.

use tracing::warn;

use crate::streaming;
use crate::{IntoResponse, Request, Response, Status, mime};

/// `GET /uploads/{*path}`
///
/// Serves song files and cover art straight from the media root with the
/// same range handling as song streaming.
pub async fn serve(req: Request) -> Response {
    let library = match super::library(&req) {
        Ok(library) => library,
        Err(res) => return res,
    };

    let raw = req.param("path").unwrap_or_default();
    let decoded = match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => return Response::error(Status::NotFound, "Not found"),
    };
    let Some(path) = library.resolve(&decoded) else {
        warn!(path = %decoded, "refusing path outside media root");
        return Response::error(Status::NotFound, "Not found");
    };

    let content_type = mime::for_upload(&path);
    streaming::serve_request(&path, req.headers(), &content_type, library.chunk_size())
        .await
        .unwrap_or_else(IntoResponse::into_response)
}
