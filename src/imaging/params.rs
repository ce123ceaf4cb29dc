//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it:
//!
//! - [`Effect`]: one configured step of a style pipeline, as written in
//!   `derivgen.toml`. Effects are relative ("fit inside 100×100") and only
//!   become concrete once the source dimensions are known.
//! - [`Operation`]: one concrete pixel operation with exact numbers, produced
//!   by [`plan_operations`](super::operations::plan_operations).
//! - [`DeriveParams`]: the full job handed to a backend: source, output,
//!   operations and encoding quality.
//! - [`Quality`]: lossy encoding quality (1–100, default 90), clamped on
//!   construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Horizontal anchor for [`Effect::Crop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAnchor {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor for [`Effect::Crop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Clockwise rotation in quarter turns. Written as degrees in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// Whether width and height trade places.
    pub fn swaps_sides(self) -> bool {
        !matches!(self, Rotation::Half)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = String;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarter),
            other => Err(format!("rotation must be 90, 180 or 270 degrees, got {other}")),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// One step of a style's transform pipeline.
///
/// Serialized with a `kind` tag:
///
/// ```toml
/// effects = [
///     { kind = "scale_and_crop", width = 220, height = 220 },
///     { kind = "desaturate" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Effect {
    /// Fit inside the box, preserving aspect ratio. A missing side is derived
    /// from the other. Never enlarges unless `upscale` is set.
    Scale {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        #[serde(default)]
        upscale: bool,
    },
    /// Resize to cover the box, then center-crop to exactly `width × height`.
    ScaleAndCrop { width: u32, height: u32 },
    /// Resize to exactly `width × height`, ignoring aspect ratio.
    Resize { width: u32, height: u32 },
    /// Cut a `width × height` region without scaling.
    Crop {
        width: u32,
        height: u32,
        #[serde(default)]
        anchor_x: HorizontalAnchor,
        #[serde(default)]
        anchor_y: VerticalAnchor,
    },
    Rotate { degrees: Rotation },
    Desaturate,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side(value: Option<u32>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "auto".into())
        }
        match self {
            Effect::Scale {
                width,
                height,
                upscale,
            } => {
                write!(f, "scale {}×{}", side(*width), side(*height))?;
                if *upscale {
                    write!(f, " (upscale)")?;
                }
                Ok(())
            }
            Effect::ScaleAndCrop { width, height } => {
                write!(f, "scale and crop {}×{}", width, height)
            }
            Effect::Resize { width, height } => write!(f, "resize {}×{}", width, height),
            Effect::Crop { width, height, .. } => write!(f, "crop {}×{}", width, height),
            Effect::Rotate { degrees } => write!(f, "rotate {}°", degrees.degrees()),
            Effect::Desaturate => write!(f, "desaturate"),
        }
    }
}

/// A concrete pixel operation with exact dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Resample to exactly this size.
    Resize { width: u32, height: u32 },
    /// Keep the region starting at `(x, y)`.
    Crop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    Rotate(Rotation),
    Grayscale,
}

/// Everything a backend needs to write one derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct DeriveParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub operations: Vec<Operation>,
    pub quality: Quality,
}
