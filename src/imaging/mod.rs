//! Image processing: the transform engine behind every style.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Crop / rotate / desaturate** | `DynamicImage` helpers |
//! | **Encode** | JPEG (quality-controlled), PNG, GIF by output extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`Effect`]s as configured, [`Operation`]s as planned
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Planning effects against a source size and running them

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{create_derivative, plan_derivative, plan_operations};
pub use params::{
    DeriveParams, Effect, HorizontalAnchor, Operation, Quality, Rotation, VerticalAnchor,
};
pub use rust_backend::RustBackend;
