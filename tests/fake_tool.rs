//! End-to-end runs of the `brand-assets` binary against a scripted stand-in
//! for `sips`.
//!
//! The stand-in treats any file whose first line is `W H` as a W×H image.
//! Crop and resize write such a header to their `--out` path, and resize pads
//! the file with zeros to `FAKE_SIPS_OUTPUT_BYTES` (default 2048) so the byte
//! budget can be driven from the test. Every invocation is appended to
//! `FAKE_SIPS_LOG` when set.
//!
//! Run with: cargo test --test fake_tool
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tempfile::TempDir;

const FAKE_SIPS: &str = r##"#!/bin/sh
set -u

if [ -n "${FAKE_SIPS_LOG:-}" ]; then
  printf '%s\n' "$*" >> "$FAKE_SIPS_LOG"
fi

read_dims() {
  if [ ! -f "$1" ]; then
    echo "Error: file not found: $1" >&2
    exit 1
  fi
  w=""
  h=""
  read -r w h < "$1" || true
  case "$w" in ''|*[!0-9]*) echo "Error: cannot read $1" >&2; exit 1;; esac
  case "$h" in ''|*[!0-9]*) echo "Error: cannot read $1" >&2; exit 1;; esac
}

write_image() {
  printf '%s %s\n' "$2" "$3" > "$1"
  pad=$(( $4 - ${#2} - ${#3} - 2 ))
  if [ "$pad" -gt 0 ]; then
    head -c "$pad" /dev/zero >> "$1"
  fi
}

case "$1" in
  --help)
    echo "sips - scriptable image processing system"
    ;;
  -g)
    read_dims "$5"
    printf '%s\n  pixelWidth: %s\n  pixelHeight: %s\n' "$5" "$w" "$h"
    ;;
  --cropToHeightWidth)
    read_dims "$4"
    if [ "$3" -gt "$w" ] || [ "$2" -gt "$h" ]; then
      echo "Error: crop larger than image" >&2
      exit 1
    fi
    write_image "$6" "$3" "$2" 0
    ;;
  -s)
    read_dims "$7"
    write_image "$9" "$6" "$5" "${FAKE_SIPS_OUTPUT_BYTES:-2048}"
    ;;
  *)
    echo "Error: unsupported arguments: $*" >&2
    exit 1
    ;;
esac
"##;

/// Path of the stand-in script, written once per test process.
fn fake_sips() -> &'static Path {
    static SCRIPT: OnceLock<PathBuf> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        let path = Path::new(env!("CARGO_TARGET_TMPDIR")).join("fake-sips");
        fs::write(&path, FAKE_SIPS).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    })
}

/// A scratch working directory with a source "image" in it.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn source(&self, name: &str, width: u32, height: u32) -> &Self {
        fs::write(self.path().join(name), format!("{width} {height}\n")).unwrap();
        self
    }

    fn file(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.path().join(name), contents).unwrap();
        self
    }

    fn log_path(&self) -> PathBuf {
        self.path().join("sips.log")
    }

    /// Tool invocations so far, one per line.
    fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_brand-assets"))
            .current_dir(self.path())
            .env_remove("BRAND_ASSETS_LOG")
            .env_remove("BRAND_ASSETS_TOOL")
            .env("FAKE_SIPS_LOG", self.log_path())
            .arg("--tool")
            .arg(fake_sips())
            .args(args)
            .envs(envs.iter().copied())
            .output()
            .unwrap()
    }

    /// `W H` header of a generated output.
    fn header(&self, rel: &str) -> String {
        let bytes = fs::read(self.path().join(rel)).unwrap();
        let end = bytes.iter().position(|&b| b == b'\n').unwrap();
        String::from_utf8(bytes[..end].to_vec()).unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Single-asset flows
// =============================================================================

#[test]
fn logo_from_wide_source_is_square() {
    let project = Project::new();
    project.source("brand.jpg", 1600, 900);

    let out = project.run(&["logo", "--input", "brand.jpg", "--output", "public/logo.png"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(project.header("public/logo.png"), "1000 1000");
    let text = stdout(&out);
    assert!(text.contains("Logo → public/logo.png"), "stdout: {text}");
    assert!(text.contains("Crop: 900x900 (centered)"), "stdout: {text}");

    let calls = project.invocations();
    assert_eq!(calls.len(), 5, "calls: {calls:?}");
    assert_eq!(calls[0], "--help");
    assert!(calls[2].starts_with("--cropToHeightWidth 900 900 brand.jpg --out "));
    assert!(calls[2].contains("normalize-logo-"));
    assert!(calls[3].starts_with("-s format png -z 1000 1000 "));
    assert!(calls[3].ends_with("--out public/logo.png"));
}

#[test]
fn social_share_from_wide_source_fits_budget() {
    let project = Project::new();
    project.source("hero.png", 2000, 1200);

    let out = project.run(&[
        "social-share",
        "--input",
        "hero.png",
        "--output",
        "public/social-share.png",
    ]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let output = project.path().join("public/social-share.png");
    assert_eq!(project.header("public/social-share.png"), "1280 640");
    assert!(fs::metadata(&output).unwrap().len() < 1_000_000);
    assert!(stdout(&out).contains("Crop: 2000x1000 (centered)"));
}

#[test]
fn oversize_social_share_fails_and_is_removed() {
    let project = Project::new();
    project.source("hero.png", 2000, 1200);

    let out = project.run_with_env(
        &["social-share", "--input", "hero.png", "--output", "social-share.png"],
        &[("FAKE_SIPS_OUTPUT_BYTES", "1100001")],
    );

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("social-share.png must be under 1MB"), "stderr: {err}");
    assert!(err.contains("Current size: 1100001 bytes"), "stderr: {err}");
    assert!(!project.path().join("social-share.png").exists());
}

#[test]
fn keep_invalid_config_leaves_oversize_output() {
    let project = Project::new();
    project
        .source("hero.png", 2000, 1200)
        .file("brand-assets.toml", "[output]\nkeep_invalid = true\n");

    let out = project.run_with_env(
        &["social-share", "--input", "hero.png", "--output", "social-share.png"],
        &[("FAKE_SIPS_OUTPUT_BYTES", "1000000")],
    );

    assert_eq!(out.status.code(), Some(1));
    let output = project.path().join("social-share.png");
    assert_eq!(fs::metadata(output).unwrap().len(), 1_000_000);
}

#[test]
fn workspace_is_removed_after_run() {
    let project = Project::new();
    let scratch = project.path().join("scratch");
    fs::create_dir(&scratch).unwrap();
    project.source("brand.jpg", 800, 1200).file(
        "brand-assets.toml",
        &format!("[workspace]\nparent = {:?}\n", scratch.to_string_lossy()),
    );

    let out = project.run(&["logo", "--input", "brand.jpg", "--output", "logo.png"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(project.invocations()[2].contains(&*scratch.to_string_lossy()));
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
}

// =============================================================================
// Failures before any pixel work
// =============================================================================

#[test]
fn jpg_output_rejected_without_tool_invocation() {
    let project = Project::new();
    project.source("brand.jpg", 1600, 900);

    let out = project.run(&["logo", "--input", "brand.jpg", "--output", "out/logo.jpg"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Output must be a .png file."));
    assert!(project.invocations().is_empty());
    assert!(!project.path().join("out").exists());
}

#[test]
fn argument_errors_win_over_broken_config() {
    let project = Project::new();
    project
        .source("brand.jpg", 1600, 900)
        .file("brand-assets.toml", "[backend\nkind = ");

    let out = project.run(&["logo", "--input", "brand.jpg", "--output", "logo.jpg"]);

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("Output must be a .png file."), "stderr: {err}");
    assert!(!err.contains("TOML"), "stderr: {err}");
    assert!(project.invocations().is_empty());
}

#[test]
fn missing_output_prints_usage() {
    let project = Project::new();
    project.source("brand.jpg", 1600, 900);

    let out = project.run(&["social-share", "--input", "brand.jpg"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains(
        "Usage: brand-assets social-share --input <path> --output <path>"
    ));
    assert!(project.invocations().is_empty());
}

#[test]
fn missing_input_prints_usage() {
    let project = Project::new();

    let out = project.run(&["logo", "--output", "logo.png"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage: brand-assets logo --input <path> --output <path>"));
}

#[test]
fn unavailable_tool_reported() {
    let project = Project::new();
    project.source("brand.jpg", 1600, 900);

    let out = Command::new(env!("CARGO_BIN_EXE_brand-assets"))
        .current_dir(project.path())
        .env_remove("BRAND_ASSETS_TOOL")
        .args(["--tool", "/nonexistent/sips"])
        .args(["logo", "--input", "brand.jpg", "--output", "public/logo.png"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("is required but not available on this system."));
    assert!(!project.path().join("public").exists());
}

#[test]
fn unreadable_source_reported() {
    let project = Project::new();
    project.file("brand.jpg", "not an image\n");

    let out = project.run(&["logo", "--input", "brand.jpg", "--output", "logo.png"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Unable to read dimensions for brand.jpg"));
    assert!(!project.path().join("logo.png").exists());
}

// =============================================================================
// Other commands
// =============================================================================

#[test]
fn all_produces_both_assets() {
    let project = Project::new();
    project.source("brand.jpg", 2000, 1200);

    let out = project.run(&["--json", "all", "--input", "brand.jpg", "--out-dir", "public"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(project.header("public/logo.png"), "1000 1000");
    assert_eq!(project.header("public/social-share.png"), "1280 640");

    let reports: Vec<serde_json::Value> = stdout(&out)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["asset"], "logo");
    assert_eq!(reports[0]["crop"]["width"], 1200);
    assert_eq!(reports[1]["asset"], "social-share");
    assert_eq!(reports[1]["bytes"], 2048);
}

#[test]
fn all_reports_each_failure() {
    let project = Project::new();
    project.source("brand.jpg", 2000, 1200);

    let out = project.run_with_env(
        &["all", "--input", "brand.jpg", "--out-dir", "public"],
        &[("FAKE_SIPS_OUTPUT_BYTES", "1100001")],
    );

    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("social-share.png must be under 1MB"), "stderr: {err}");
    assert!(project.path().join("public/logo.png").exists());
    let text = stdout(&out);
    assert!(text.contains("Logo → public/logo.png"), "stdout: {text}");
    assert!(!text.contains("Social share →"), "stdout: {text}");
}

#[test]
fn gen_config_prints_stock_file() {
    let project = Project::new();

    let out = project.run(&["gen-config"]);

    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[backend]"));
    assert!(text.contains("keep_invalid = false"));
    assert!(project.invocations().is_empty());
}
