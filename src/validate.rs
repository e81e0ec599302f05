//! Post-condition checks on a finished asset.
//!
//! Validation only classifies: it never deletes or rewrites the artifact.
//! Whether a failing output stays on disk is the pipeline's call.

use crate::imaging::{Dimensions, ImageBackend, get_dimensions};
use crate::pipeline::AssetError;
use crate::target::TargetSpec;
use std::path::Path;

/// Measurements of an output that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedOutput {
    pub dimensions: Dimensions,
    pub bytes: u64,
}

/// Check `output` against `target`.
///
/// Dimensions must match exactly. When the target has a byte budget the file
/// must be strictly smaller than it: a file of exactly `max_bytes` fails.
pub fn validate_output(
    backend: &impl ImageBackend,
    output: &Path,
    target: &TargetSpec,
) -> Result<ValidatedOutput, AssetError> {
    let actual = get_dimensions(backend, output)?;
    if actual != target.dimensions {
        return Err(AssetError::DimensionMismatch {
            asset: target.name,
            expected: target.dimensions,
            actual,
        });
    }

    let bytes = std::fs::metadata(output)?.len();
    if let Some(limit) = target.max_bytes.filter(|&limit| bytes >= limit) {
        return Err(AssetError::SizeExceeded {
            asset: target.name,
            limit,
            actual: bytes,
        });
    }

    Ok(ValidatedOutput {
        dimensions: actual,
        bytes,
    })
}
