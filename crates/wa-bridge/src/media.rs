//! Media store for downloaded attachments
//!
//! Every attachment is written once under a fresh UUID filename and is
//! reachable at `<media root><filename>`. Files are never rewritten or
//! removed.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;

/// A persisted attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub filename: String,
    pub path: PathBuf,
    pub url: String,
}

/// Directory-backed attachment store
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    root: String,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, root: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            root: root.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the media directory (and parents) if missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Public URL of a stored file
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}{}", self.root, filename)
    }

    /// Write `bytes` under a newly generated filename
    pub async fn store(&self, bytes: &[u8]) -> Result<StoredMedia> {
        let filename = uuid::Uuid::new_v4().to_string();
        let path = self.dir.join(&filename);

        // create_new: a stored file is never overwritten
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!("Stored {} bytes of media at {}", bytes.len(), path.display());

        Ok(StoredMedia {
            url: self.url_for(&filename),
            filename,
            path,
        })
    }
}
