//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: probe, identify, crop, and resize_and_encode.
//!
//! The production implementation is
//! [`SipsBackend`](super::sips_backend::SipsBackend), which shells out to the
//! platform image tool. [`RustBackend`](super::rust_backend::RustBackend)
//! implements the same capability in-process with the `image` crate.

use super::params::{CropParams, ResizeParams};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{program} is required but not available on this system.")]
    Unavailable { program: String },
    #[error("Unable to read dimensions for {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel extent of an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Build dimensions, rejecting a zero extent on either axis.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the pipeline is
/// backend-agnostic. Calls are synchronous: each one returns only once the
/// underlying work (or subprocess) has finished.
pub trait ImageBackend: Sync {
    /// Check that the backend can run at all. Called once per pipeline run,
    /// before any file I/O.
    fn probe(&self) -> Result<(), BackendError>;

    /// Get image dimensions. Zero or missing extents are an error.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Extract a centered rectangle of exactly `params.crop` pixels.
    fn crop(&self, params: &CropParams) -> Result<(), BackendError>;

    /// Convert to the output format and resize to exactly `params.target` pixels.
    fn resize_and_encode(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
