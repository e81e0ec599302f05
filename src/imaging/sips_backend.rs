//! External-tool backend that shells out to `sips`.
//!
//! ## Command mapping
//!
//! | Operation | Invocation |
//! |---|---|
//! | Probe | `sips --help` |
//! | Identify | `sips -g pixelWidth -g pixelHeight <path>` |
//! | Crop | `sips --cropToHeightWidth <h> <w> <source> --out <output>` |
//! | Resize + encode | `sips -s format png -z <h> <w> <source> --out <output>` |
//!
//! `sips` centers `--cropToHeightWidth` on the source, so the crop carries no
//! offset. Crop and resize are two separate invocations because the combined
//! flags do not guarantee a centered crop.
//!
//! Every numeric argument comes from a [`Dimensions`] value and is rendered
//! with `to_string()`; no user text is ever spliced into an argument, and the
//! command runs without a shell.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{CropParams, ResizeParams};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tracing::debug;

static WIDTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pixelWidth:\s*(\d+)").expect("width pattern must compile"));
static HEIGHT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pixelHeight:\s*(\d+)").expect("height pattern must compile"));

/// Backend that drives the external image tool as a subprocess.
#[derive(Debug, Clone)]
pub struct SipsBackend {
    program: PathBuf,
}

impl SipsBackend {
    pub fn new() -> Self {
        Self::with_program("sips")
    }

    /// Use a specific executable (name looked up on `PATH`, or a path).
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Run the tool to completion and return its stdout.
    fn run(&self, args: &[OsString]) -> Result<String, BackendError> {
        debug!(program = %self.program.display(), ?args, "running image tool");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "could not start {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            return Err(BackendError::ProcessingFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for SipsBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for the metadata query.
pub fn identify_args(path: &Path) -> Vec<OsString> {
    vec![
        "-g".into(),
        "pixelWidth".into(),
        "-g".into(),
        "pixelHeight".into(),
        path.into(),
    ]
}

/// Arguments for a centered crop. `sips` takes height before width.
pub fn crop_args(params: &CropParams) -> Vec<OsString> {
    vec![
        "--cropToHeightWidth".into(),
        params.crop.height.to_string().into(),
        params.crop.width.to_string().into(),
        params.source.as_os_str().into(),
        "--out".into(),
        params.output.as_os_str().into(),
    ]
}

/// Arguments for format conversion plus exact resize.
pub fn resize_args(params: &ResizeParams) -> Vec<OsString> {
    vec![
        "-s".into(),
        "format".into(),
        params.format.tool_name().into(),
        "-z".into(),
        params.target.height.to_string().into(),
        params.target.width.to_string().into(),
        params.source.as_os_str().into(),
        "--out".into(),
        params.output.as_os_str().into(),
    ]
}

/// Parse `pixelWidth` / `pixelHeight` out of the tool's metadata listing.
///
/// A missing field, a value that does not fit in `u32`, or a zero extent all
/// mean the image is unreadable.
pub fn parse_dimensions(output: &str, path: &Path) -> Result<Dimensions, BackendError> {
    let unreadable = |reason: &str| BackendError::Unreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let field = |pattern: &Regex, name: &str| -> Result<u32, BackendError> {
        let captures = pattern
            .captures(output)
            .ok_or_else(|| unreadable(&format!("{name} missing from tool output")))?;
        captures[1]
            .parse::<u32>()
            .map_err(|e| unreadable(&format!("{name} is not a pixel count: {e}")))
    };

    let width = field(&WIDTH_PATTERN, "pixelWidth")?;
    let height = field(&HEIGHT_PATTERN, "pixelHeight")?;

    Dimensions::new(width, height).ok_or_else(|| unreadable(&format!("got {width}x{height}")))
}

fn ensure_positive(dims: Dimensions, what: &str) -> Result<(), BackendError> {
    if dims.width == 0 || dims.height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "refusing {what} to {dims}: dimensions must be positive"
        )));
    }
    Ok(())
}

impl ImageBackend for SipsBackend {
    fn probe(&self) -> Result<(), BackendError> {
        self.run(&[OsString::from("--help")])
            .map(|_| ())
            .map_err(|_| BackendError::Unavailable {
                program: self.program_name(),
            })
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let output = self
            .run(&identify_args(path))
            .map_err(|e| BackendError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        parse_dimensions(&output, path)
    }

    fn crop(&self, params: &CropParams) -> Result<(), BackendError> {
        ensure_positive(params.crop, "crop")?;
        self.run(&crop_args(params)).map(|_| ())
    }

    fn resize_and_encode(&self, params: &ResizeParams) -> Result<(), BackendError> {
        ensure_positive(params.target, "resize")?;
        self.run(&resize_args(params)).map(|_| ())
    }
}
