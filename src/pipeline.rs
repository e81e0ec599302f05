//! Asset pipeline: source image in, validated asset out.
//!
//! ## Stages
//!
//! ```text
//! Parsing → Inspecting → Transforming → Validating → Done
//!    └──────────┴────────────┴─────────────┴──────→ Failed
//! ```
//!
//! - **Parsing**: both paths present, output has a `.png` extension. Nothing
//!   touches the filesystem or the backend until this passes.
//! - **Inspecting**: backend probe, output parent directories, source
//!   dimensions, crop geometry.
//! - **Transforming**: workspace acquired, centered crop into the workspace,
//!   then convert + resize into the final output.
//! - **Validating**: exact dimensions and byte budget of the final output.
//!
//! Stages only move forward. The workspace is released after Transforming and
//! Validating whatever their outcome. There is no retry: a failed run reports
//! one [`AssetError`] and the caller decides whether to run again.
//!
//! ## Failed outputs
//!
//! Once the resize step has written the output path, the file there may not
//! meet the contract. Unless [`PipelineOptions::keep_invalid_output`] is set,
//! that file is deleted before the error is returned. A file that already
//! existed at the output path and was not replaced by resize is always left
//! alone, including when the output path is the source image.

use crate::imaging::{
    BackendError, Dimensions, ImageBackend, OutputFormat, compute_crop, crop_to_target,
    get_dimensions, resize_to_target,
};
use crate::target::{AssetKind, TargetSpec};
use crate::validate::{ValidatedOutput, validate_output};
use crate::workspace::Workspace;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{program} is required but not available on this system.")]
    ToolUnavailable { program: String },
    #[error("Unable to read dimensions for {}: {reason}", .path.display())]
    DimensionRead { path: PathBuf, reason: String },
    #[error("Image tool failed: {0}")]
    ExternalTool(String),
    #[error("{asset} must be {expected}, got {actual}")]
    DimensionMismatch {
        asset: &'static str,
        expected: Dimensions,
        actual: Dimensions,
    },
    #[error("{asset} must be under {}. Current size: {actual} bytes", human_limit(.limit))]
    SizeExceeded {
        asset: &'static str,
        limit: u64,
        actual: u64,
    },
    #[error("Could not create workspace: {0}")]
    Workspace(std::io::Error),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BackendError> for AssetError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable { program } => AssetError::ToolUnavailable { program },
            BackendError::Unreadable { path, reason } => AssetError::DimensionRead { path, reason },
            BackendError::ProcessingFailed(msg) => AssetError::ExternalTool(msg),
            BackendError::Io(e) => AssetError::ExternalTool(e.to_string()),
        }
    }
}

/// `1000000` → `1MB`; anything not a whole number of megabytes stays in bytes.
fn human_limit(limit: &u64) -> String {
    let limit = *limit;
    if limit >= 1_000_000 && limit % 1_000_000 == 0 {
        format!("{}MB", limit / 1_000_000)
    } else {
        format!("{limit} bytes")
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Inspecting,
    Transforming,
    Validating,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Raw command-line paths, before validation.
#[derive(Debug, Clone, Default)]
pub struct AssetArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// A validated request for one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub kind: AssetKind,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl AssetRequest {
    /// Validate raw arguments. Touches neither the filesystem nor a backend.
    pub fn parse(kind: AssetKind, args: &AssetArgs) -> Result<Self, AssetError> {
        let present = |p: &Option<PathBuf>| p.clone().filter(|p| !p.as_os_str().is_empty());
        let (Some(input), Some(output)) = (present(&args.input), present(&args.output)) else {
            return Err(AssetError::InvalidArguments(usage(kind)));
        };
        if !OutputFormat::Png.matches_extension(&output) {
            return Err(AssetError::InvalidArguments(
                "Output must be a .png file.".to_string(),
            ));
        }
        Ok(Self {
            kind,
            input,
            output,
        })
    }
}

/// Usage line for one asset subcommand.
pub fn usage(kind: AssetKind) -> String {
    format!(
        "Usage: brand-assets {} --input <path> --output <path>",
        kind.command()
    )
}

/// Knobs that do not change the asset contract.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Directory for scratch workspaces; OS temp dir when `None`.
    pub workspace_parent: Option<PathBuf>,
    /// Leave an output that failed after resize on disk.
    pub keep_invalid_output: bool,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReport {
    pub asset: AssetKind,
    pub source: PathBuf,
    pub source_dimensions: Dimensions,
    pub crop: Dimensions,
    pub output: PathBuf,
    pub dimensions: Dimensions,
    pub bytes: u64,
}

/// Tracks the current stage and logs transitions.
struct Run {
    kind: AssetKind,
    stage: Stage,
}

impl Run {
    fn new(kind: AssetKind) -> Self {
        debug!(asset = kind.command(), stage = %Stage::Parsing, "starting run");
        Self {
            kind,
            stage: Stage::Parsing,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!(asset = self.kind.command(), from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    fn fail(&mut self, err: AssetError) -> AssetError {
        debug!(
            asset = self.kind.command(),
            stage = %self.stage,
            error = %err,
            "run failed"
        );
        self.stage = Stage::Failed;
        err
    }
}

/// Produce one asset.
///
/// Every run starts from Parsing with fresh state; nothing is shared between
/// runs, so independent runs may execute concurrently.
pub fn run(
    backend: &impl ImageBackend,
    kind: AssetKind,
    args: &AssetArgs,
    options: &PipelineOptions,
) -> Result<AssetReport, AssetError> {
    let mut state = Run::new(kind);
    let result = execute(backend, kind, args, options, &mut state);
    match result {
        Ok(report) => {
            state.advance(Stage::Done);
            Ok(report)
        }
        Err(err) => Err(state.fail(err)),
    }
}

fn execute(
    backend: &impl ImageBackend,
    kind: AssetKind,
    args: &AssetArgs,
    options: &PipelineOptions,
    state: &mut Run,
) -> Result<AssetReport, AssetError> {
    let request = AssetRequest::parse(kind, args)?;
    let target = kind.target();

    state.advance(Stage::Inspecting);
    backend.probe()?;
    if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let source_dimensions = get_dimensions(backend, &request.input)?;
    let crop = compute_crop(source_dimensions, target);
    info!(
        asset = kind.command(),
        source = %source_dimensions,
        crop = %crop,
        target = %target.dimensions,
        "computed centered crop"
    );

    state.advance(Stage::Transforming);
    let mut workspace = Workspace::acquire(kind.workspace_prefix(), options.workspace_parent.as_deref())
        .map_err(AssetError::Workspace)?;
    let mut before_resize = None;
    let outcome = transform_and_validate(
        backend,
        &request,
        target,
        crop,
        &workspace,
        &mut before_resize,
        state,
    );
    if let Err(e) = workspace.release() {
        warn!(workspace = %workspace.path().display(), error = %e, "failed to remove workspace");
    }

    match outcome {
        Ok(validated) => Ok(AssetReport {
            asset: kind,
            source: request.input,
            source_dimensions,
            crop,
            output: request.output,
            dimensions: validated.dimensions,
            bytes: validated.bytes,
        }),
        Err(err) => {
            let replaced = before_resize
                .as_ref()
                .is_some_and(|snapshot| snapshot.replaced_at(&request.output));
            if replaced && !options.keep_invalid_output {
                discard_output(&request.output);
            }
            Err(err)
        }
    }
}

fn transform_and_validate(
    backend: &impl ImageBackend,
    request: &AssetRequest,
    target: &TargetSpec,
    crop: Dimensions,
    workspace: &Workspace,
    before_resize: &mut Option<OutputSnapshot>,
    state: &mut Run,
) -> Result<ValidatedOutput, AssetError> {
    let cropped = workspace.cropped_path();
    crop_to_target(backend, &request.input, &cropped, crop)?;

    *before_resize = Some(OutputSnapshot::take(&request.output));
    resize_to_target(backend, &cropped, &request.output, target)?;

    state.advance(Stage::Validating);
    validate_output(backend, &request.output, target)
}

/// What was at the output path just before the resize step.
///
/// Only a file the resize step put there may be discarded; a file that was
/// already present and is unchanged (a failed resize, or output == input)
/// stays.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputSnapshot {
    Absent,
    Present {
        len: u64,
        modified: Option<SystemTime>,
    },
}

impl OutputSnapshot {
    fn take(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) => OutputSnapshot::Present {
                len: meta.len(),
                modified: meta.modified().ok(),
            },
            Err(_) => OutputSnapshot::Absent,
        }
    }

    /// Whether a file now at `path` differs from this snapshot.
    fn replaced_at(&self, path: &Path) -> bool {
        let now = Self::take(path);
        now != OutputSnapshot::Absent && now != *self
    }
}

fn discard_output(output: &Path) {
    match std::fs::remove_file(output) {
        Ok(()) => warn!(output = %output.display(), "removed output that failed validation"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(output = %output.display(), error = %e, "could not remove invalid output"),
    }
}
