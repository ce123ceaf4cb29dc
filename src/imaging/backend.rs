//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the narrow interface to the transform engine:
//! read an image's dimensions, and write a derivative from a planned list of
//! [`Operation`](super::params::Operation)s. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::DeriveParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode `params.source`, apply the operations in order, and encode the
    /// result to `params.output` in the format implied by its extension.
    fn derive(&self, params: &DeriveParams) -> Result<(), BackendError>;
}
