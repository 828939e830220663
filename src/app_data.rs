//! Persistent application data
//!
//! Playlist sources keep the last successfully fetched playlist here so a
//! restart can serve channels before the upstream answers again.

use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::AppResult;

#[derive(Debug, Clone)]
pub struct AppData {
    dir: PathBuf,
}

impl AppData {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the data directory if it does not exist yet
    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Cache path for a playlist URL. The URL may carry credentials, so only
    /// its hash ends up on disk.
    pub fn playlist_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        let short = &hex::encode(digest)[..16];
        self.dir.join(format!("playlist-{short}.m3u"))
    }

    pub async fn load_playlist(&self, url: &str) -> AppResult<Option<String>> {
        let path = self.playlist_path(url);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                debug!("Loaded cached playlist {}", path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temporary file so a crash never leaves a truncated cache
    pub async fn store_playlist(&self, url: &str, contents: &str) -> AppResult<()> {
        let path = self.playlist_path(url);
        let tmp = path.with_extension("m3u.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Cached playlist {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}
