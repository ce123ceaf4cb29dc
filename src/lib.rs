//! # derivgen
//!
//! Batch-generates image style derivatives for a managed public file store.
//! Every original image in the store gets one resized/cropped/filtered copy
//! per configured style, written next to the originals under `styles/`.
//!
//! # Architecture: Select, Filter, Drive
//!
//! ```text
//! 1. Select   file index  →  Vec<FileRecord>   (image originals in scope)
//! 2. Filter   styles      →  Vec<&Style>       (include / exclude lists)
//! 3. Drive    styles × files → derivatives     (skip existing, purge on request)
//! ```
//!
//! Each step reports what it does as [`Event`](types::Event)s through a
//! caller-supplied callback; the CLI prints them, tests collect them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`select`] | File Selector and Style Filter: `DirectoryScope`, `FileFilter`, name lists |
//! | [`driver`] | Derivative Driver: the style × file loop, purge, `RunSummary` |
//! | [`progress`] | Per-style 25/50/75/100% thresholds |
//! | [`index`] | Managed-file index: JSON export or a walk of the store |
//! | [`storage`] | `scheme://target` URIs and the local public store |
//! | [`style`] | Named effect pipelines and the ordered `StyleRegistry` |
//! | [`imaging`] | Pure-Rust transform engine: effect planning, resize, crop, rotate, encode |
//! | [`config`] | `derivgen.toml` loading, merging, and validation |
//! | [`types`] | `Event`, shared by the selection and generation steps |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Existence Is the Cache
//!
//! A derivative that already exists at its destination is never regenerated.
//! There is no manifest or content hash: deleting a derivative (or passing
//! `--purge`) is how it gets rebuilt. Re-running after a failure picks up
//! where the previous run stopped.
//!
//! ## Fail Fast, Keep Progress
//!
//! Any storage or imaging error aborts the run. Derivatives written before
//! the failure stay on disk, so the next run only fills the gaps.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, Lanczos3
//! resampling, and encoding. No ImageMagick or other system libraries.

pub mod config;
pub mod driver;
pub mod imaging;
pub mod index;
pub mod output;
pub mod progress;
pub mod select;
pub mod storage;
pub mod style;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
