//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Dimensions are `(width, height)` tuples; results are never smaller than 1px.

use super::params::{HorizontalAnchor, VerticalAnchor};

/// Dimensions after fitting `current` inside an optional `width × height` box.
///
/// With only one side given, the other follows the source aspect ratio. With
/// both, the side that constrains more wins. Unless `upscale` is set, a result
/// larger than the source in either direction leaves the source size unchanged.
///
/// ```text
/// 1600x1200 → box 100x100       → 100x75
/// 1600x1200 → width 400 only    → 400x300
/// 80x60     → box 100x100       → 80x60   (no upscale)
/// ```
pub fn calculate_scale_dimensions(
    current: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    upscale: bool,
) -> (u32, u32) {
    let (cur_w, cur_h) = current;
    let aspect = cur_h as f64 / cur_w as f64;

    let (w, h) = match (width, height) {
        (Some(w), Some(h)) if aspect < h as f64 / w as f64 => {
            // Wider than the box: width constrains
            (w, (w as f64 * aspect).round() as u32)
        }
        (Some(_), Some(h)) | (None, Some(h)) => ((h as f64 / aspect).round() as u32, h),
        (Some(w), None) => (w, (w as f64 * aspect).round() as u32),
        (None, None) => return current,
    };

    if !upscale && (w > cur_w || h > cur_h) {
        return current;
    }
    (w.max(1), h.max(1))
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let w = (tgt_h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), tgt_h)
    } else {
        // Source is taller: width will match, height will exceed
        let h = (tgt_w as f64 / src_aspect).round() as u32;
        (tgt_w, h.max(tgt_h))
    }
}

/// A crop rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Place a `target` sized crop inside `current` according to the anchors.
///
/// The crop is clamped to the image, so asking for more than is available
/// keeps the full extent on that axis.
pub fn calculate_crop_rect(
    current: (u32, u32),
    target: (u32, u32),
    anchor_x: HorizontalAnchor,
    anchor_y: VerticalAnchor,
) -> CropRect {
    let width = target.0.min(current.0);
    let height = target.1.min(current.1);
    let spare_x = current.0 - width;
    let spare_y = current.1 - height;

    let x = match anchor_x {
        HorizontalAnchor::Left => 0,
        HorizontalAnchor::Center => spare_x / 2,
        HorizontalAnchor::Right => spare_x,
    };
    let y = match anchor_y {
        VerticalAnchor::Top => 0,
        VerticalAnchor::Center => spare_y / 2,
        VerticalAnchor::Bottom => spare_y,
    };

    CropRect {
        x,
        y,
        width,
        height,
    }
}
