//! Choosing what to process: which originals, and which styles.
//!
//! ## File selection
//!
//! A [`FileFilter`] is a structural predicate over index records. A record
//! matches when its MIME type is one of [`IMAGE_MIME_TYPES`] **and** its URI
//! is `<scheme>://<stem>.<ext>` with `ext` in [`IMAGE_EXTENSIONS`] and a stem
//! allowed by the [`DirectoryScope`]:
//!
//! | `--dir` | Scope | Accepts |
//! |---|---|---|
//! | unset / empty | `All` | any stem, nested or not |
//! | `public` | `RootOnly` | stems without `/` (files directly in the root) |
//! | `xyz` | `Subtree("xyz")` | stems starting with `xyz` plus at least one more character |
//!
//! `Subtree` is a plain string prefix: `xyz` also matches `xyz2/a.png`. Pass
//! `xyz/` to stay inside the directory.
//!
//! ## Style selection
//!
//! Styles are walked in registry order. An excluded name is always skipped,
//! even when also included; an empty include list means every style.

use crate::index::{FileIndex, FileRecord, IndexError};
use crate::storage::StorageUri;
use crate::style::Style;
use crate::types::Event;

/// `--dir` value meaning "only files directly in the store root".
pub const ROOT_SCOPE_SENTINEL: &str = "public";

/// Extensions of originals that get derivatives.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "gif", "png"];

/// MIME types of originals that get derivatives.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/gif", "image/png"];

/// Which part of the store a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DirectoryScope {
    #[default]
    All,
    RootOnly,
    Subtree(String),
}

impl DirectoryScope {
    /// Interpret the `--dir` option.
    pub fn from_option(dir: Option<&str>) -> Self {
        match dir {
            None | Some("") => DirectoryScope::All,
            Some(ROOT_SCOPE_SENTINEL) => DirectoryScope::RootOnly,
            Some(prefix) => DirectoryScope::Subtree(prefix.to_string()),
        }
    }

    /// Whether a URI target with its extension removed lies in this scope.
    fn accepts_stem(&self, stem: &str) -> bool {
        match self {
            DirectoryScope::All => true,
            DirectoryScope::RootOnly => !stem.contains('/'),
            DirectoryScope::Subtree(prefix) => stem
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.is_empty()),
        }
    }
}

/// Compound filter: image MIME type AND in-scope image URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    scheme: String,
    scope: DirectoryScope,
}

impl FileFilter {
    pub fn new(scheme: impl Into<String>, scope: DirectoryScope) -> Self {
        Self {
            scheme: scheme.into(),
            scope,
        }
    }

    pub fn scope(&self) -> &DirectoryScope {
        &self.scope
    }

    pub fn matches(&self, record: &FileRecord) -> bool {
        self.accepts_mime(&record.filemime) && self.accepts_uri(&record.uri)
    }

    pub fn accepts_mime(&self, mime: &str) -> bool {
        IMAGE_MIME_TYPES.contains(&mime)
    }

    pub fn accepts_uri(&self, uri: &StorageUri) -> bool {
        if uri.scheme() != self.scheme {
            return false;
        }
        let Some((stem, ext)) = uri.target().rsplit_once('.') else {
            return false;
        };
        IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) && self.scope.accepts_stem(stem)
    }
}

/// Everything the command line decides about a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionCriteria {
    pub scope: DirectoryScope,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub purge: bool,
}

impl SelectionCriteria {
    /// Build from the raw CLI values (comma-delimited lists, `--dir`, `--purge`).
    pub fn from_args(
        styles: Option<&str>,
        exclude: Option<&str>,
        dir: Option<&str>,
        purge: bool,
    ) -> Self {
        Self {
            scope: DirectoryScope::from_option(dir),
            includes: styles.map(parse_name_list).unwrap_or_default(),
            excludes: exclude.map(parse_name_list).unwrap_or_default(),
            purge,
        }
    }
}

/// Split a comma-delimited list, trimming whitespace and dropping empty items.
pub fn parse_name_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Query the index for originals matching `filter`, in index order.
///
/// Emits [`Event::FilesFound`] with the count-only query result first.
pub fn select_files(
    index: &(impl FileIndex + ?Sized),
    filter: &FileFilter,
    on_event: &mut impl FnMut(Event),
) -> Result<Vec<FileRecord>, IndexError> {
    let count = index.count(filter)?;
    on_event(Event::FilesFound { count });
    let files = index.query(filter)?;
    tracing::debug!(scope = ?filter.scope(), count = files.len(), "selected files");
    Ok(files)
}

/// Pick the styles to process, in registry order.
///
/// Emits [`Event::StyleExcluded`] for every style dropped by `excludes`.
pub fn select_styles<'a>(
    all: &'a [Style],
    includes: &[String],
    excludes: &[String],
    on_event: &mut impl FnMut(Event),
) -> Vec<&'a Style> {
    for name in includes {
        if !all.iter().any(|s| &s.name == name) {
            tracing::warn!(style = %name, "requested style is not configured");
        }
    }

    let mut selected = Vec::new();
    for style in all {
        if excludes.contains(&style.name) {
            on_event(Event::StyleExcluded {
                name: style.name.clone(),
            });
            continue;
        }
        if includes.is_empty() || includes.contains(&style.name) {
            selected.push(style);
        }
    }
    selected
}
