//! Content types for stored media.
//!
//! Songs and covers are identified by file extension only, the same way the
//! upload filter accepted them.

use std::path::Path;

/// Extensions accepted as audio.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac", "mpeg", "aac"];

/// Extensions accepted as cover art.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Fallback for songs whose extension tells us nothing.
pub const DEFAULT_AUDIO: &str = "audio/mpeg";

const OCTET_STREAM: &str = "application/octet-stream";

/// Content type of a song file. Unknown or non-audio extensions fall back to
/// `audio/mpeg` since everything in the song store is audio.
pub fn for_song(path: &Path) -> String {
    guess(path)
        .filter(|m| m.starts_with("audio/"))
        .unwrap_or_else(|| DEFAULT_AUDIO.to_owned())
}

/// Content type of an arbitrary stored upload.
pub fn for_upload(path: &Path) -> String {
    guess(path).unwrap_or_else(|| {
        tracing::warn!(path = %path.display(), "can't guess MIME type");
        OCTET_STREAM.to_owned()
    })
}

fn guess(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !AUDIO_EXTENSIONS.contains(&ext.as_str()) && !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    // `.mpeg` is MPEG audio in a song store, not video.
    if ext == "mpeg" {
        return Some(DEFAULT_AUDIO.to_owned());
    }
    mime_guess::from_ext(&ext).first().map(|m| m.essence_str().to_owned())
}
