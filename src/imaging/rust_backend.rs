//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF) | `image::ImageReader` |
//! | Identify | `image::image_dimensions` (header only) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Grayscale | `DynamicImage::grayscale` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with configured quality |
//! | Encode → PNG / GIF | `DynamicImage::save_with_format` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{DeriveParams, Operation, Rotation};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn apply(img: DynamicImage, op: &Operation) -> DynamicImage {
    match *op {
        Operation::Resize { width, height } => img.resize_exact(width, height, FilterType::Lanczos3),
        Operation::Crop {
            x,
            y,
            width,
            height,
        } => img.crop_imm(x, y, width, height),
        Operation::Rotate(Rotation::Quarter) => img.rotate90(),
        Operation::Rotate(Rotation::Half) => img.rotate180(),
        Operation::Rotate(Rotation::ThreeQuarter) => img.rotate270(),
        Operation::Grayscale => img.grayscale(),
    }
}

/// Save a DynamicImage to the given path, inferring format from extension.
///
/// The image is encoded into a hidden sibling file and renamed onto `path`
/// only once encoding succeeds, so a failed encode never leaves a file at
/// `path`.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let partial = partial_path(path);

    let encoded = match ext.as_str() {
        "jpg" | "jpeg" => save_jpeg(img, &partial, quality),
        "png" => save_with_format(img, &partial, ImageFormat::Png),
        // The GIF encoder only takes RGBA frames
        "gif" => save_with_format(&DynamicImage::from(img.to_rgba8()), &partial, ImageFormat::Gif),
        other => {
            return Err(BackendError::ProcessingFailed(format!(
                "Unsupported output format: {}",
                other
            )));
        }
    };

    match encoded {
        Ok(()) => std::fs::rename(&partial, path).map_err(BackendError::Io),
        Err(e) => {
            std::fs::remove_file(&partial).ok();
            Err(e)
        }
    }
}

/// `dir/name.jpg` → `dir/.name.jpg.partial`
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    // JPEG has no alpha channel
    let flattened = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img.clone(),
        other => DynamicImage::from(other.to_rgb8()),
    };
    flattened
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

fn save_with_format(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
) -> Result<(), BackendError> {
    img.save_with_format(path, format).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to write {}: {}", path.display(), e))
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn derive(&self, params: &DeriveParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let result = params.operations.iter().fold(img, apply);
        save_image(&result, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::write_test_image;
    use tempfile::TempDir;

    fn derive(source: &Path, output: &Path, operations: Vec<Operation>) {
        RustBackend::new()
            .derive(&DeriveParams {
                source: source.to_path_buf(),
                output: output.to_path_buf(),
                operations,
                quality: Quality::new(85),
            })
            .unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_image(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn derive_resizes_jpeg() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("out.jpg");
        write_test_image(&source, 400, 300);

        derive(
            &source,
            &output,
            vec![Operation::Resize {
                width: 100,
                height: 75,
            }],
        );

        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 75));
    }

    #[test]
    fn derive_crops_and_rotates_png() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let output = tmp.path().join("out.png");
        write_test_image(&source, 300, 200);

        derive(
            &source,
            &output,
            vec![
                Operation::Crop {
                    x: 10,
                    y: 20,
                    width: 120,
                    height: 80,
                },
                Operation::Rotate(Rotation::Quarter),
            ],
        );

        assert_eq!(image::image_dimensions(&output).unwrap(), (80, 120));
    }

    #[test]
    fn derive_grayscale_gif() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.gif");
        let output = tmp.path().join("out.gif");
        write_test_image(&source, 64, 48);

        derive(&source, &output, vec![Operation::Grayscale]);

        assert_eq!(image::image_dimensions(&output).unwrap(), (64, 48));
    }

    #[test]
    fn derive_without_operations_copies_pixels() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let output = tmp.path().join("out.png");
        write_test_image(&source, 32, 32);

        derive(&source, &output, Vec::new());

        assert_eq!(image::image_dimensions(&output).unwrap(), (32, 32));
    }

    #[test]
    fn derive_unsupported_output_format_errors() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        write_test_image(&source, 16, 16);

        let result = RustBackend::new().derive(&DeriveParams {
            source,
            output: tmp.path().join("out.bmp"),
            operations: Vec::new(),
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn failed_encode_leaves_no_output() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("out.jpg");
        write_test_image(&source, 40, 1);

        // Wider than JPEG can encode
        let result = RustBackend::new().derive(&DeriveParams {
            source,
            output: output.clone(),
            operations: vec![Operation::Resize {
                width: 70_000,
                height: 1,
            }],
            quality: Quality::default(),
        });

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
        assert!(!partial_path(&output).exists());
    }

    #[test]
    fn successful_encode_removes_partial_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let output = tmp.path().join("out.png");
        write_test_image(&source, 20, 20);

        derive(&source, &output, Vec::new());

        assert!(output.exists());
        assert!(!partial_path(&output).exists());
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {names:?}");
    }

    #[test]
    fn partial_path_is_hidden_sibling() {
        assert_eq!(
            partial_path(Path::new("/store/styles/thumb/a.jpg")),
            PathBuf::from("/store/styles/thumb/.a.jpg.partial")
        );
    }

    #[test]
    fn derive_corrupt_source_errors() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let result = RustBackend::new().derive(&DeriveParams {
            source,
            output: tmp.path().join("out.jpg"),
            operations: Vec::new(),
            quality: Quality::default(),
        });
        assert!(result.is_err());
    }
}
