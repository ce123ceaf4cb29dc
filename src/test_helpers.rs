//! Shared test utilities for the derivgen test suite.
//!
//! Builds throwaway public stores, index records, and small real images.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let (store, files) = seed_store(tmp.path(), &["a.jpg", "xyz/b.png"]);
//! assert_eq!(files[1].uri.to_string(), "public://xyz/b.png");
//! ```

use std::path::Path;

use crate::index::{FileRecord, mime_for_path};
use crate::storage::{PublicStore, StorageUri};

// =========================================================================
// Records
// =========================================================================

/// Build an index record. Panics on a malformed URI.
pub fn record(fid: u64, uri: &str, mime: &str) -> FileRecord {
    let uri = StorageUri::parse(uri).unwrap_or_else(|e| panic!("bad test uri '{uri}': {e}"));
    let filename = uri
        .target()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    FileRecord {
        fid,
        filename,
        uri,
        filemime: mime.to_string(),
    }
}

/// Owned names from string literals.
pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Stores
// =========================================================================

/// Create empty files at the given store-relative paths.
pub fn store_files(root: &Path, relatives: &[&str]) {
    for relative in relatives {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"").unwrap();
    }
}

/// Create a `public://` store at `root` holding empty originals, and the
/// matching records in the given order (fids start at 1).
pub fn seed_store(root: &Path, targets: &[&str]) -> (PublicStore, Vec<FileRecord>) {
    store_files(root, targets);
    let store = PublicStore::new("public", root);
    let records = targets
        .iter()
        .enumerate()
        .map(|(i, target)| {
            record(
                i as u64 + 1,
                &format!("public://{target}"),
                mime_for_path(Path::new(target)),
            )
        })
        .collect();
    (store, records)
}

// =========================================================================
// Images
// =========================================================================

/// Write a small gradient image in the format implied by the extension.
///
/// GIF is written as RGBA, everything else as RGB.
pub fn write_test_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let rgb = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    let is_gif = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if is_gif {
        image::DynamicImage::ImageRgb8(rgb)
            .to_rgba8()
            .save(path)
            .unwrap();
    } else {
        rgb.save(path).unwrap();
    }
}
