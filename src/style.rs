//! Named image styles and the ordered style registry.
//!
//! A style is a name plus an ordered list of [`Effect`]s. Its derivative of
//! `public://2024/dawn.jpg` lives at
//! `public://styles/<style>/public/2024/dawn.jpg`, and keeps the source
//! format.
//!
//! ## Ordering
//!
//! [`StyleRegistry`] keeps styles in the order of the `[[styles]]` tables in
//! `derivgen.toml`. That order is part of the contract: styles are filtered
//! and processed in it, so status output is stable between runs.

use crate::imaging::{BackendError, Effect, ImageBackend, Quality, create_derivative};
use crate::storage::{PublicStore, STYLES_DIR, StorageError, StorageUri};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Image processing failed for {uri}: {source}")]
    Imaging {
        uri: StorageUri,
        #[source]
        source: BackendError,
    },
}

/// A named, pre-configured transform pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Style {
    /// Machine name; also the directory name under `styles/`.
    pub name: String,
    /// Human-readable label for listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Effects applied in order.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Style {
    pub fn new(name: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            name: name.into(),
            label: None,
            effects,
        }
    }

    /// Where this style's derivative of `source` is stored.
    ///
    /// `public://a/b.png` → `public://styles/<name>/public/a/b.png`
    pub fn build_destination_uri(&self, source: &StorageUri) -> StorageUri {
        StorageUri::new(
            source.scheme(),
            format!(
                "{}/{}/{}/{}",
                STYLES_DIR,
                self.name,
                source.scheme(),
                source.target()
            ),
        )
    }

    /// Render the derivative of `source` to `destination`, creating parent
    /// directories as needed.
    ///
    /// On failure nothing is left at `destination`: an existing file there
    /// means a finished derivative.
    pub fn materialize(
        &self,
        backend: &impl ImageBackend,
        store: &PublicStore,
        source: &StorageUri,
        destination: &StorageUri,
        quality: Quality,
    ) -> Result<(), StyleError> {
        let source_path = store.realpath(source)?;
        let output_path = store.prepare_parent(destination)?;
        create_derivative(backend, &source_path, &output_path, &self.effects, quality).map_err(
            |source_err| {
                discard_partial(&output_path);
                StyleError::Imaging {
                    uri: source.clone(),
                    source: source_err,
                }
            },
        )
    }
}

fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not remove partial derivative")
        }
    }
}

/// All configured styles, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: Vec<Style>,
}

impl StyleRegistry {
    pub fn new(styles: Vec<Style>) -> Self {
        Self { styles }
    }

    /// Every style, in registry order.
    pub fn load_all(&self) -> &[Style] {
        &self.styles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Operation;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    fn thumbnail() -> Style {
        Style::new(
            "thumbnail",
            vec![Effect::Scale {
                width: Some(100),
                height: Some(100),
                upscale: false,
            }],
        )
    }

    #[test]
    fn destination_nests_under_styles_dir() {
        let source = StorageUri::new("public", "2024/03/dawn.jpg");
        let dest = thumbnail().build_destination_uri(&source);
        assert_eq!(
            dest.to_string(),
            "public://styles/thumbnail/public/2024/03/dawn.jpg"
        );
    }

    #[test]
    fn destination_for_root_file() {
        let dest = thumbnail().build_destination_uri(&StorageUri::new("public", "a.png"));
        assert_eq!(dest.to_string(), "public://styles/thumbnail/public/a.png");
    }

    #[test]
    fn materialize_creates_parent_and_derives() {
        let tmp = TempDir::new().unwrap();
        let store = PublicStore::new("public", tmp.path());
        let source = store.uri("photo.jpg");
        std::fs::write(store.realpath(&source).unwrap(), b"").unwrap();
        let style = thumbnail();
        let dest = style.build_destination_uri(&source);
        let backend = MockBackend::with_dimensions(1600, 1200);

        style
            .materialize(&backend, &store, &source, &dest, Quality::new(75))
            .unwrap();

        let derived = tmp.path().join("styles/thumbnail/public/photo.jpg");
        assert!(derived.exists());
        let ops = backend.get_operations();
        assert!(matches!(
            &ops[1],
            RecordedOp::Derive { output, quality: 75, operations, .. }
                if output == &derived.to_string_lossy()
                    && operations == &[Operation::Resize { width: 100, height: 75 }]
        ));
    }

    #[test]
    fn materialize_wraps_backend_failure() {
        let tmp = TempDir::new().unwrap();
        let store = PublicStore::new("public", tmp.path());
        let source = store.uri("photo.jpg");
        let style = thumbnail();
        let dest = style.build_destination_uri(&source);
        let backend = MockBackend::failing_at(0);

        let result = style.materialize(&backend, &store, &source, &dest, Quality::default());
        assert!(matches!(result, Err(StyleError::Imaging { .. })));
        // The mock leaves a truncated file behind; it must be gone
        assert!(!store.exists(&dest).unwrap());
    }

    #[test]
    fn registry_preserves_order() {
        let registry = StyleRegistry::new(vec![
            Style::new("teaser", Vec::new()),
            Style::new("thumbnail", Vec::new()),
            Style::new("large", Vec::new()),
        ]);
        let names: Vec<&str> = registry.load_all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["teaser", "thumbnail", "large"]);
    }
}
