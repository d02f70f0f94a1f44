//! Build metadata for incremental rebuilds

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata schema version; a mismatch forces a full rebuild
pub const METADATA_VERSION: u32 = 2;

/// What the previous build saw, keyed by docname
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub version: u32,
    pub built_at: DateTime<Utc>,
    pub source_dir: PathBuf,
    /// Language the terms were extracted with
    pub language: String,
    pub documents: BTreeMap<String, SourceFileMetadata>,
    /// Canonical path of the index file this build wrote
    #[serde(default)]
    pub index_path: Option<PathBuf>,
    /// Size and modification time of that index file right after writing
    #[serde(default)]
    pub index_file: Option<SourceFileMetadata>,
}

impl BuildMetadata {
    pub fn new(source_dir: &Path, language: &str) -> Self {
        Self {
            version: METADATA_VERSION,
            built_at: Utc::now(),
            source_dir: source_dir.to_path_buf(),
            language: language.to_string(),
            documents: BTreeMap::new(),
            index_path: None,
            index_file: None,
        }
    }

    /// Remember the index file written from this metadata
    pub fn record_index(&mut self, path: &Path) -> anyhow::Result<()> {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve index path: {}", path.display()))?;
        let filename = canonical.to_string_lossy().to_string();
        self.index_file = Some(SourceFileMetadata::from_path(&canonical, &filename)?);
        self.index_path = Some(canonical);
        Ok(())
    }

    /// Whether `path` is still the exact index file this metadata describes
    ///
    /// False when the index was written elsewhere, has been rewritten since,
    /// or was never recorded.
    pub fn describes_index(&self, path: &Path) -> bool {
        let (Some(recorded_path), Some(recorded_file)) = (&self.index_path, &self.index_file)
        else {
            return false;
        };
        match path.canonicalize() {
            Ok(canonical) if canonical == *recorded_path => {
                matches!(recorded_file.is_stale(&canonical), Ok(false))
            }
            _ => false,
        }
    }
}

/// Size and modification time of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileMetadata {
    pub filename: String,
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub size: u64,
}

impl SourceFileMetadata {
    /// Create metadata from file path
    pub fn from_path(path: &Path, filename: &str) -> anyhow::Result<Self> {
        let metadata = fs::metadata(path)?;
        let mtime = metadata.modified()?.duration_since(SystemTime::UNIX_EPOCH)?;

        Ok(Self {
            filename: filename.to_string(),
            mtime_secs: mtime.as_secs() as i64,
            mtime_nanos: mtime.subsec_nanos(),
            size: metadata.len(),
        })
    }

    /// Check if the file has changed (filename, mtime or size differs)
    pub fn is_stale(&self, path: &Path) -> anyhow::Result<bool> {
        let current = Self::from_path(path, &self.filename)?;
        Ok(*self != current)
    }
}
