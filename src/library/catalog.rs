//! In-memory song catalog backed by a JSON file.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use super::{CatalogError, MediaStore, Song, SongId};

/// Song metadata held in memory, immutable once loaded.
///
/// The file is a JSON array of songs:
///
/// ```json
/// [
///   { "id": 1, "title": "Intro", "artist": "Someone",
///     "file_path": "/uploads/songs/song-1700000000000-42.mp3" }
/// ]
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    songs: HashMap<SongId, Song>,
}

impl Catalog {
    /// Builds a catalog from songs already in memory.
    pub fn from_songs(songs: impl IntoIterator<Item = Song>) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for song in songs {
            let id = song.id;
            if map.insert(id, song).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { songs: map })
    }

    /// Reads the catalog at `path`. A missing file yields an empty catalog so
    /// a fresh install can start before anything has been uploaded.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "catalog file missing, starting empty");
                return Ok(Self::default());
            }
            Err(source) => return Err(CatalogError::Read { path: path.to_owned(), source }),
        };
        let songs: Vec<Song> = serde_json::from_slice(&raw)
            .map_err(|source| CatalogError::Parse { path: path.to_owned(), source })?;
        Self::from_songs(songs)
    }

    pub fn len(&self) -> usize { self.songs.len() }
    pub fn is_empty(&self) -> bool { self.songs.is_empty() }
}

#[async_trait]
impl MediaStore for Catalog {
    async fn song(&self, id: SongId) -> Result<Option<Song>, CatalogError> {
        Ok(self.songs.get(&id).cloned())
    }
}
