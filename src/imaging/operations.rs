//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a target, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_centered_crop;
use super::params::{CropParams, OutputFormat, ResizeParams};
use crate::target::TargetSpec;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Compute the centered crop rectangle for `source` under `target`'s ratio.
pub fn compute_crop(source: Dimensions, target: &TargetSpec) -> Dimensions {
    let (width, height) =
        calculate_centered_crop(source.as_tuple(), target.dimensions.as_tuple());
    Dimensions { width, height }
}

/// Plan a crop operation without executing it.
pub fn plan_crop(source: &Path, intermediate: &Path, crop: Dimensions) -> CropParams {
    CropParams {
        source: source.to_path_buf(),
        output: intermediate.to_path_buf(),
        crop,
    }
}

/// Plan the convert + resize step without executing it.
pub fn plan_resize(intermediate: &Path, output: &Path, target: &TargetSpec) -> ResizeParams {
    ResizeParams {
        source: intermediate.to_path_buf(),
        output: output.to_path_buf(),
        target: target.dimensions,
        format: OutputFormat::Png,
    }
}

/// Crop `source` into `intermediate` and confirm the intermediate exists.
///
/// Returns only once the crop has fully completed, so the resize step never
/// reads a file that is still being written.
pub fn crop_to_target(
    backend: &impl ImageBackend,
    source: &Path,
    intermediate: &Path,
    crop: Dimensions,
) -> Result<()> {
    backend.crop(&plan_crop(source, intermediate, crop))?;
    if !intermediate.is_file() {
        return Err(BackendError::ProcessingFailed(format!(
            "crop did not produce {}",
            intermediate.display()
        )));
    }
    Ok(())
}

/// Convert and resize the intermediate into the final output.
pub fn resize_to_target(
    backend: &impl ImageBackend,
    intermediate: &Path,
    output: &Path,
    target: &TargetSpec,
) -> Result<()> {
    backend.resize_and_encode(&plan_resize(intermediate, output, target))
}
