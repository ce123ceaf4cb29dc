//! The managed-file index: which originals exist and what they are.
//!
//! The index maps file ids to storage URIs and MIME types. Two sources are
//! supported:
//!
//! - [`ManifestIndex`]: a JSON export of the managed-file table, one object
//!   per file:
//!
//!   ```json
//!   [
//!     { "fid": 1, "filename": "dawn.jpg", "uri": "public://dawn.jpg", "filemime": "image/jpeg" }
//!   ]
//!   ```
//!
//! - [`StoreIndex`]: walks the public store directly. The top-level
//!   `styles/` tree holds derivatives, not originals, and is skipped. MIME
//!   types are derived from file extensions and ids follow walk order.
//!
//! Both answer the same compound query through [`FileIndex`]; the filter
//! itself lives in [`select`](crate::select).

use crate::select::FileFilter;
use crate::storage::{PublicStore, STYLES_DIR, StorageUri};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read file index {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed file index {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One managed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub fid: u64,
    pub filename: String,
    pub uri: StorageUri,
    pub filemime: String,
}

/// Query interface over managed files.
pub trait FileIndex {
    /// All records matching `filter`, in index order.
    fn query(&self, filter: &FileFilter) -> Result<Vec<FileRecord>, IndexError>;

    /// Number of records matching `filter`.
    fn count(&self, filter: &FileFilter) -> Result<usize, IndexError> {
        Ok(self.query(filter)?.len())
    }
}

/// Index backed by a JSON export of the managed-file table.
#[derive(Debug, Clone)]
pub struct ManifestIndex {
    records: Vec<FileRecord>,
}

impl ManifestIndex {
    pub fn new(records: Vec<FileRecord>) -> Self {
        Self { records }
    }

    /// Read an exported index. A missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path).map_err(|source| IndexError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records = serde_json::from_str(&content).map_err(|source| IndexError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { records })
    }
}

impl FileIndex for ManifestIndex {
    fn query(&self, filter: &FileFilter) -> Result<Vec<FileRecord>, IndexError> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn count(&self, filter: &FileFilter) -> Result<usize, IndexError> {
        Ok(self.records.iter().filter(|r| filter.matches(r)).count())
    }
}

/// Index built by walking the store's root directory on each query.
#[derive(Debug, Clone)]
pub struct StoreIndex {
    store: PublicStore,
}

impl StoreIndex {
    pub fn new(store: PublicStore) -> Self {
        Self { store }
    }

    /// Every regular file under the root except the derivative tree, sorted
    /// by path.
    fn records(&self) -> Result<Vec<FileRecord>, IndexError> {
        let root = self.store.root();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_derivative_tree(e));

        let mut records = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| IndexError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let Some(parts) = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()
            else {
                tracing::warn!(path = %entry.path().display(), "skipping file with a non-UTF-8 name");
                continue;
            };
            let target = parts.join("/");
            records.push(FileRecord {
                fid: records.len() as u64 + 1,
                filename: parts.last().copied().unwrap_or_default().to_string(),
                filemime: mime_for_path(entry.path()).to_string(),
                uri: self.store.uri(target),
            });
        }
        Ok(records)
    }
}

fn is_derivative_tree(entry: &walkdir::DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == STYLES_DIR
}

impl FileIndex for StoreIndex {
    fn query(&self, filter: &FileFilter) -> Result<Vec<FileRecord>, IndexError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }
}

/// The configured index: the JSON export at `path`, or a walk of `store`.
pub fn open(path: Option<&Path>, store: &PublicStore) -> Result<Box<dyn FileIndex>, IndexError> {
    Ok(match path {
        Some(path) => Box::new(ManifestIndex::load(path)?),
        None => Box::new(StoreIndex::new(store.clone())),
    })
}

/// MIME type for a file, judged by its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
