//! In-process backend built on the `image` crate.
//!
//! An alternative to [`SipsBackend`](super::sips_backend::SipsBackend) for
//! machines without the platform tool. It implements the same capability and
//! the same contract: crop is centered, resize is exact (no aspect-preserving
//! fit), and the final artifact is always encoded in the requested format.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` with format sniffing (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Centered crop | `DynamicImage::crop_imm` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → PNG | `DynamicImage::save_with_format` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{CropParams, OutputFormat, ResizeParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
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

/// Load and decode an image from disk, sniffing the format from content.
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

fn image_format(format: OutputFormat) -> ImageFormat {
    match format {
        OutputFormat::Png => ImageFormat::Png,
    }
}

fn save_image(img: &DynamicImage, path: &Path, format: OutputFormat) -> Result<(), BackendError> {
    img.save_with_format(path, image_format(format))
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
        })
}

/// Top-left corner of a `crop` rectangle centered on `source`.
fn centered_origin(source: Dimensions, crop: Dimensions) -> (u32, u32) {
    (
        source.width.saturating_sub(crop.width) / 2,
        source.height.saturating_sub(crop.height) / 2,
    )
}

impl ImageBackend for RustBackend {
    fn probe(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let unreadable = |reason: String| BackendError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };
        // Sniff the format from content, as `load_image` does, so a missing or
        // wrong extension does not matter.
        let (width, height) = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| unreadable(e.to_string()))?
            .into_dimensions()
            .map_err(|e| unreadable(e.to_string()))?;
        Dimensions::new(width, height).ok_or_else(|| unreadable(format!("got {width}x{height}")))
    }

    fn crop(&self, params: &CropParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let source = Dimensions {
            width: img.width(),
            height: img.height(),
        };
        if params.crop.width > source.width || params.crop.height > source.height {
            return Err(BackendError::ProcessingFailed(format!(
                "crop {} exceeds source {}",
                params.crop, source
            )));
        }

        let (x, y) = centered_origin(source, params.crop);
        let cropped = img.crop_imm(x, y, params.crop.width, params.crop.height);
        save_image(&cropped, &params.output, OutputFormat::Png)
    }

    fn resize_and_encode(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(
            params.target.width,
            params.target.height,
            FilterType::Lanczos3,
        );
        save_image(&resized, &params.output, params.format)
    }
}
