//! Local article store: deterministic paths for bodies, annotation artifacts
//! and summaries.
//!
//! # Layout
//!
//! ```text
//! root_dir/
//! └── ScrapedFiles/
//!     ├── 9901.txt           # body text
//!     ├── 9901.txt.xml       # annotation artifact (canonical)
//!     └── Summary/
//!         └── METADATASUMMARY_9901_12658.csv
//!
//! annotator working_dir/
//! └── 9901.txt.xml           # annotation artifact (staging)
//! ```

use crate::models::{ArticleId, Mode};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Which per-article file a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Plain-text article body.
    Body,
    /// Sentence-annotated sentiment output.
    Annotation,
}

/// Whether a path is where this system keeps a file, or where the external
/// annotator drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Canonical,
    Staging,
}

/// Per-article files on local disk.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    scraped_dir: PathBuf,
    staging_dir: PathBuf,
}

impl ArticleStore {
    /// Create a store rooted at `root_dir` whose annotator writes into `staging_dir`.
    pub fn new(root_dir: &Path, staging_dir: &Path) -> Self {
        Self {
            scraped_dir: root_dir.join("ScrapedFiles"),
            staging_dir: staging_dir.to_path_buf(),
        }
    }

    /// Deterministic path of one artifact for `id`.
    pub fn path(&self, id: ArticleId, artifact: Artifact, location: Location) -> PathBuf {
        let dir = match location {
            Location::Canonical => &self.scraped_dir,
            Location::Staging => &self.staging_dir,
        };
        let name = match artifact {
            Artifact::Body => format!("{id}.txt"),
            Artifact::Annotation => format!("{id}.txt.xml"),
        };
        dir.join(name)
    }

    /// Canonical body path for `id`.
    pub fn body_path(&self, id: ArticleId) -> PathBuf {
        self.path(id, Artifact::Body, Location::Canonical)
    }

    /// Summary CSV path for one mode and id range.
    pub fn summary_path(&self, mode: Mode, start: ArticleId, end: ArticleId) -> PathBuf {
        self.scraped_dir
            .join("Summary")
            .join(format!("{}_{}_{}.csv", mode.summary_prefix(), start, end))
    }

    /// Overwrite the stored body for `id`.
    #[instrument(level = "debug", skip_all, fields(%id))]
    pub async fn write(&self, id: ArticleId, body: &str) -> io::Result<()> {
        fs::create_dir_all(&self.scraped_dir).await?;
        let path = self.body_path(id);
        fs::write(&path, body).await?;
        debug!(path = %path.display(), bytes = body.len(), "Wrote article body");
        Ok(())
    }

    /// Whether a body is stored for `id`.
    pub async fn exists(&self, id: ArticleId) -> bool {
        fs::try_exists(self.body_path(id)).await.unwrap_or(false)
    }

    /// Character count of the stored body, `0` when there is none.
    #[instrument(level = "debug", skip_all, fields(%id))]
    pub async fn read_length(&self, id: ArticleId) -> usize {
        let path = self.body_path(id);
        match fs::read(&path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).chars().count(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored body");
                0
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read stored body");
                0
            }
        }
    }
}
