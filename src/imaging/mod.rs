//! Image operations: geometry is computed here, pixels are pushed elsewhere.
//!
//! | Operation | Default backend (`sips`) | In-process backend |
//! |---|---|---|
//! | **Probe** | `sips --help` | always available |
//! | **Identify** | `sips -g pixelWidth -g pixelHeight` | `image::image_dimensions` |
//! | **Crop** | `sips --cropToHeightWidth` | `crop_imm` at the centered origin |
//! | **Resize → PNG** | `sips -s format png -z` | `resize_exact` + PNG encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`SipsBackend`] + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod sips_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_centered_crop;
pub use operations::{compute_crop, crop_to_target, get_dimensions, resize_to_target};
pub use params::{CropParams, OutputFormat, ResizeParams};
pub use rust_backend::RustBackend;
pub use sips_backend::SipsBackend;
