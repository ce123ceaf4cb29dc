//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! style's effects, compute concrete [`Operation`]s, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    calculate_crop_rect, calculate_fill_dimensions, calculate_scale_dimensions,
};
use super::params::{DeriveParams, Effect, HorizontalAnchor, Operation, Quality, VerticalAnchor};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Turn a list of effects into concrete operations for a source of the given
/// size.
///
/// Dimensions are tracked through the pipeline, so each effect sees the
/// output of the previous one. Effects that would not change the image
/// (scaling to the current size, cropping to the full extent) produce no
/// operation.
pub fn plan_operations(effects: &[Effect], source: (u32, u32)) -> Vec<Operation> {
    let mut current = source;
    let mut ops = Vec::new();

    for effect in effects {
        match *effect {
            Effect::Scale {
                width,
                height,
                upscale,
            } => {
                let target = calculate_scale_dimensions(current, width, height, upscale);
                push_resize(&mut ops, &mut current, target);
            }
            Effect::ScaleAndCrop { width, height } => {
                let fill = calculate_fill_dimensions(current, (width, height));
                push_resize(&mut ops, &mut current, fill);
                push_crop(
                    &mut ops,
                    &mut current,
                    (width, height),
                    HorizontalAnchor::Center,
                    VerticalAnchor::Center,
                );
            }
            Effect::Resize { width, height } => {
                push_resize(&mut ops, &mut current, (width, height));
            }
            Effect::Crop {
                width,
                height,
                anchor_x,
                anchor_y,
            } => push_crop(&mut ops, &mut current, (width, height), anchor_x, anchor_y),
            Effect::Rotate { degrees } => {
                ops.push(Operation::Rotate(degrees));
                if degrees.swaps_sides() {
                    current = (current.1, current.0);
                }
            }
            Effect::Desaturate => ops.push(Operation::Grayscale),
        }
    }

    ops
}

fn push_resize(ops: &mut Vec<Operation>, current: &mut (u32, u32), target: (u32, u32)) {
    if target != *current {
        ops.push(Operation::Resize {
            width: target.0,
            height: target.1,
        });
        *current = target;
    }
}

fn push_crop(
    ops: &mut Vec<Operation>,
    current: &mut (u32, u32),
    target: (u32, u32),
    anchor_x: HorizontalAnchor,
    anchor_y: VerticalAnchor,
) {
    let rect = calculate_crop_rect(*current, target, anchor_x, anchor_y);
    if (rect.width, rect.height) != *current {
        ops.push(Operation::Crop {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
        *current = (rect.width, rect.height);
    }
}

/// Plan a derivative without executing it.
pub fn plan_derivative(
    source: &Path,
    output: &Path,
    source_dims: (u32, u32),
    effects: &[Effect],
    quality: Quality,
) -> DeriveParams {
    DeriveParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        operations: plan_operations(effects, source_dims),
        quality,
    }
}

/// Identify `source`, plan the effects against its size, and write `output`.
pub fn create_derivative(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    effects: &[Effect],
    quality: Quality,
) -> Result<()> {
    let dims = backend.identify(source)?;
    let params = plan_derivative(source, output, (dims.width, dims.height), effects, quality);
    backend.derive(&params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::Rotation;

    fn scale(w: u32, h: u32) -> Effect {
        Effect::Scale {
            width: Some(w),
            height: Some(h),
            upscale: false,
        }
    }

    #[test]
    fn plan_scale() {
        let ops = plan_operations(&[scale(100, 100)], (1600, 1200));
        assert_eq!(
            ops,
            vec![Operation::Resize {
                width: 100,
                height: 75
            }]
        );
    }

    #[test]
    fn plan_scale_noop_when_source_is_small() {
        assert!(plan_operations(&[scale(100, 100)], (40, 30)).is_empty());
    }

    #[test]
    fn plan_scale_and_crop_fills_then_centers() {
        let ops = plan_operations(
            &[Effect::ScaleAndCrop {
                width: 100,
                height: 100,
            }],
            (800, 600),
        );
        assert_eq!(
            ops,
            vec![
                Operation::Resize {
                    width: 133,
                    height: 100
                },
                Operation::Crop {
                    x: 16,
                    y: 0,
                    width: 100,
                    height: 100
                },
            ]
        );
    }

    #[test]
    fn plan_tracks_dimensions_through_rotation() {
        // 1600x1200 rotated → 1200x1600, then width-only scale to 300 → 300x400
        let ops = plan_operations(
            &[
                Effect::Rotate {
                    degrees: Rotation::Quarter,
                },
                Effect::Scale {
                    width: Some(300),
                    height: None,
                    upscale: false,
                },
            ],
            (1600, 1200),
        );
        assert_eq!(
            ops,
            vec![
                Operation::Rotate(Rotation::Quarter),
                Operation::Resize {
                    width: 300,
                    height: 400
                },
            ]
        );
    }

    #[test]
    fn plan_crop_to_full_extent_is_noop() {
        let ops = plan_operations(
            &[Effect::Crop {
                width: 500,
                height: 500,
                anchor_x: HorizontalAnchor::Left,
                anchor_y: VerticalAnchor::Top,
            }],
            (200, 100),
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn plan_resize_and_desaturate() {
        let ops = plan_operations(
            &[
                Effect::Resize {
                    width: 64,
                    height: 32,
                },
                Effect::Desaturate,
            ],
            (100, 100),
        );
        assert_eq!(
            ops,
            vec![
                Operation::Resize {
                    width: 64,
                    height: 32
                },
                Operation::Grayscale,
            ]
        );
    }

    #[test]
    fn create_derivative_identifies_then_derives() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.jpg");
        let backend = MockBackend::with_dimensions(1600, 1200);

        create_derivative(
            &backend,
            Path::new("/source.jpg"),
            &output,
            &[scale(100, 100)],
            Quality::new(85),
        )
        .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/source.jpg"));
        assert!(matches!(
            &ops[1],
            RecordedOp::Derive { quality: 85, operations, .. }
                if operations == &[Operation::Resize { width: 100, height: 75 }]
        ));
    }
}
