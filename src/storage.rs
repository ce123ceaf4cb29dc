//! Storage URIs and the local public store.
//!
//! Every managed file is addressed by a URI of the form `scheme://target`,
//! e.g. `public://2024/03/dawn.jpg`. The target is always a relative,
//! `/`-separated path. Only the public store is backed by a real directory:
//!
//! ```text
//! files/                               # PublicStore root  = public://
//! ├── dawn.jpg                         # public://dawn.jpg
//! ├── 2024/03/dusk.png                 # public://2024/03/dusk.png
//! └── styles/                          # derivative tree (never an original)
//!     └── thumbnail/public/dawn.jpg    # public://styles/thumbnail/public/dawn.jpg
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directory under the store root that holds generated derivatives.
pub const STYLES_DIR: &str = "styles";

const SCHEME_SEPARATOR: &str = "://";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed storage URI: {0}")]
    MalformedUri(String),
    #[error("Unsupported scheme '{scheme}' (store serves '{expected}://')")]
    UnsupportedScheme { scheme: String, expected: String },
    #[error("URI escapes the store root: {0}")]
    OutsideRoot(String),
}

/// A `scheme://target` address of a managed file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageUri {
    scheme: String,
    target: String,
}

impl StorageUri {
    pub fn new(scheme: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            target: target.into(),
        }
    }

    /// Parse `scheme://target`. The scheme must be non-empty.
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        match uri.split_once(SCHEME_SEPARATOR) {
            Some((scheme, target)) if !scheme.is_empty() => Ok(Self::new(scheme, target)),
            _ => Err(StorageError::MalformedUri(uri.to_string())),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The path part after `://`.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scheme, SCHEME_SEPARATOR, self.target)
    }
}

impl TryFrom<String> for StorageUri {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StorageUri> for String {
    fn from(uri: StorageUri) -> Self {
        uri.to_string()
    }
}

/// The local directory that backs one URI scheme.
#[derive(Debug, Clone)]
pub struct PublicStore {
    scheme: String,
    root: PathBuf,
}

impl PublicStore {
    pub fn new(scheme: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            scheme: scheme.into(),
            root: root.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a URI in this store's scheme.
    pub fn uri(&self, target: impl Into<String>) -> StorageUri {
        StorageUri::new(self.scheme.clone(), target)
    }

    /// Map a URI to its local path.
    ///
    /// Rejects foreign schemes and targets that are absolute or contain `..`.
    pub fn realpath(&self, uri: &StorageUri) -> Result<PathBuf, StorageError> {
        if uri.scheme() != self.scheme {
            return Err(StorageError::UnsupportedScheme {
                scheme: uri.scheme().to_string(),
                expected: self.scheme.clone(),
            });
        }
        let relative = Path::new(uri.target());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StorageError::OutsideRoot(uri.to_string()));
        }
        Ok(self.root.join(relative))
    }

    pub fn exists(&self, uri: &StorageUri) -> Result<bool, StorageError> {
        Ok(self.realpath(uri)?.is_file())
    }

    pub fn delete(&self, uri: &StorageUri) -> Result<(), StorageError> {
        std::fs::remove_file(self.realpath(uri)?)?;
        Ok(())
    }

    /// Create the parent directory of `uri` if it is missing and return the
    /// local path of `uri`.
    pub fn prepare_parent(&self, uri: &StorageUri) -> Result<PathBuf, StorageError> {
        let path = self.realpath(uri)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_splits_scheme_and_target() {
        let uri = StorageUri::parse("public://2024/dawn.jpg").unwrap();
        assert_eq!(uri.scheme(), "public");
        assert_eq!(uri.target(), "2024/dawn.jpg");
        assert_eq!(uri.to_string(), "public://2024/dawn.jpg");
    }

    #[test]
    fn parse_keeps_empty_target() {
        let uri = StorageUri::parse("public://").unwrap();
        assert_eq!(uri.target(), "");
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(matches!(
            StorageUri::parse("dawn.jpg"),
            Err(StorageError::MalformedUri(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_scheme() {
        assert!(StorageUri::parse("://dawn.jpg").is_err());
    }

    #[test]
    fn uri_serializes_as_string() {
        let uri = StorageUri::new("public", "a/b.png");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, r#""public://a/b.png""#);
        let back: StorageUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }

    #[test]
    fn realpath_joins_root() {
        let store = PublicStore::new("public", "/srv/files");
        let path = store.realpath(&store.uri("a/b.png")).unwrap();
        assert_eq!(path, PathBuf::from("/srv/files/a/b.png"));
    }

    #[test]
    fn realpath_rejects_foreign_scheme() {
        let store = PublicStore::new("public", "/srv/files");
        let result = store.realpath(&StorageUri::new("private", "a.png"));
        assert!(matches!(result, Err(StorageError::UnsupportedScheme { .. })));
    }

    #[test]
    fn realpath_rejects_parent_segments() {
        let store = PublicStore::new("public", "/srv/files");
        let result = store.realpath(&store.uri("../etc/passwd"));
        assert!(matches!(result, Err(StorageError::OutsideRoot(_))));
    }

    #[test]
    fn realpath_rejects_absolute_target() {
        let store = PublicStore::new("public", "/srv/files");
        assert!(store.realpath(&store.uri("/etc/passwd")).is_err());
    }

    #[test]
    fn exists_and_delete() {
        let tmp = TempDir::new().unwrap();
        let store = PublicStore::new("public", tmp.path());
        let uri = store.uri("x/y.png");

        assert!(!store.exists(&uri).unwrap());
        let path = store.prepare_parent(&uri).unwrap();
        fs::write(&path, "data").unwrap();
        assert!(store.exists(&uri).unwrap());

        store.delete(&uri).unwrap();
        assert!(!store.exists(&uri).unwrap());
    }

    #[test]
    fn delete_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let store = PublicStore::new("public", tmp.path());
        assert!(matches!(
            store.delete(&store.uri("missing.png")),
            Err(StorageError::Io(_))
        ));
    }

    #[test]
    fn directories_do_not_count_as_existing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("dir.png")).unwrap();
        let store = PublicStore::new("public", tmp.path());
        assert!(!store.exists(&store.uri("dir.png")).unwrap());
    }
}
