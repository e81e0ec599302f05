//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the geometry) and the [`backend`](super::backend) (which
//! does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`OutputFormat`]: Encoded format of the final artifact. Only PNG today.
//! - [`CropParams`]: Centered crop: source, intermediate output, crop rectangle.
//! - [`ResizeParams`]: Convert + resize: intermediate source, final output, exact target size.

use super::backend::Dimensions;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Encoded format of a final asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
}

impl OutputFormat {
    /// Format name as the external tool spells it.
    pub fn tool_name(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
        }
    }

    pub fn extension(self) -> &'static str {
        self.tool_name()
    }

    /// Whether `path` carries this format's extension (case-insensitive).
    pub fn matches_extension(self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension()))
    }
}

/// Parameters for a centered crop.
///
/// No offset is carried: the crop is always centered on the source.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub crop: Dimensions,
}

/// Parameters for the format conversion + exact resize step.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub target: Dimensions,
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_extension_is_case_insensitive() {
        assert!(OutputFormat::Png.matches_extension(Path::new("assets/logo.png")));
        assert!(OutputFormat::Png.matches_extension(Path::new("assets/LOGO.PNG")));
        assert!(OutputFormat::Png.matches_extension(Path::new("a.Png")));
    }

    #[test]
    fn other_extensions_do_not_match_png() {
        assert!(!OutputFormat::Png.matches_extension(Path::new("logo.jpg")));
        assert!(!OutputFormat::Png.matches_extension(Path::new("logo")));
        assert!(!OutputFormat::Png.matches_extension(Path::new("logo.png.bak")));
    }
}
