//! Song streaming.

use tracing::error;

use crate::library::SongId;
use crate::streaming::{self, StreamError};
use crate::{IntoResponse, Request, Response, Status, mime};

/// `GET /api/songs/{id}/stream`
///
/// Looks the song up, then hands its file to the range streamer. Unknown
/// ids, non-numeric ids and songs whose file has vanished are all `404`.
pub async fn stream(req: Request) -> Response {
    let library = match super::library(&req) {
        Ok(library) => library,
        Err(res) => return res,
    };

    let Some(id) = req.param("id").and_then(|id| id.parse::<SongId>().ok()) else {
        return Response::error(Status::NotFound, "Song not found");
    };

    let song = match library.song(id).await {
        Ok(Some(song)) => song,
        Ok(None) => return Response::error(Status::NotFound, "Song not found"),
        Err(e) => {
            error!(id, "error fetching song: {e}");
            return Response::error(Status::InternalServerError, "Error streaming song");
        }
    };

    let Some(path) = library.resolve(&song.file_path) else {
        error!(id, file_path = %song.file_path, "stored path escapes media root");
        return Response::error(Status::NotFound, "Song file not found");
    };

    let content_type = mime::for_song(&path);
    match streaming::serve_request(&path, req.headers(), &content_type, library.chunk_size()).await {
        Ok(res) => res,
        Err(StreamError::NotFound) => Response::error(Status::NotFound, "Song file not found"),
        Err(e) => e.into_response(),
    }
}
