//! Song metadata and the on-disk media root.
//!
//! [`Library`] is the storage handle every request handler shares. It is
//! built once by [`Library::open`] and dropped at shutdown; there is no
//! process-wide pool. Song metadata comes from a [`MediaStore`]; the bytes
//! live under the media root.

mod catalog;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use catalog::Catalog;

use crate::config::Config;
use crate::error::Error;

/// URL prefix under which stored files are published, e.g.
/// `/uploads/songs/song-1700000000-1.mp3`. Stored paths may carry it.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Numeric song identifier.
pub type SongId = i64;

/// One song's metadata as the store keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// Length in seconds, when known.
    #[serde(default)]
    pub duration: Option<u32>,
    pub file_path: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate song id {0}")]
    DuplicateId(SongId),
}

/// Read access to song metadata.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Looks a song up by id. `Ok(None)` means no such song.
    async fn song(&self, id: SongId) -> Result<Option<Song>, CatalogError>;
}

/// Shared storage handle: metadata store plus the media root.
#[derive(Clone)]
pub struct Library {
    store: Arc<dyn MediaStore>,
    media_root: PathBuf,
    chunk_size: usize,
}

impl Library {
    pub fn new(store: Arc<dyn MediaStore>, media_root: impl Into<PathBuf>, chunk_size: usize) -> Self {
        Self { store, media_root: media_root.into(), chunk_size: chunk_size.max(1) }
    }

    /// Loads the catalog named in `config` and binds it to the media root.
    pub async fn open(config: &Config) -> Result<Self, Error> {
        let catalog = Catalog::load(&config.catalog).await?;
        tracing::info!(
            songs = catalog.len(),
            media_root = %config.media_root.display(),
            "library opened"
        );
        Ok(Self::new(Arc::new(catalog), &config.media_root, config.chunk_size))
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    pub async fn song(&self, id: SongId) -> Result<Option<Song>, CatalogError> {
        self.store.song(id).await
    }

    /// Maps a stored or requested path onto the media root.
    ///
    /// Accepts both published form (`/uploads/songs/a.mp3`) and root-relative
    /// form (`songs/a.mp3`). Returns `None` for paths that would leave the
    /// root (`..`, absolute components, drive prefixes) or name nothing.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        let relative = stored
            .strip_prefix(UPLOADS_PREFIX)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(stored)
            .trim_start_matches('/');

        let mut resolved = self.media_root.clone();
        let mut depth = 0;
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        (depth > 0).then_some(resolved)
    }

    /// True when the media root is a readable directory.
    pub async fn is_ready(&self) -> bool {
        match tokio::fs::read_dir(&self.media_root).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(media_root = %self.media_root.display(), "media root unavailable: {e}");
                false
            }
        }
    }
}
