//! CLI output formatting for finished assets.
//!
//! # Output Format
//!
//! ```text
//! Logo → public/logo.png
//!     Source: brand/logo-source.jpg (1600x900)
//!     Crop: 900x900 (centered)
//!     Output: 1000x1000, 48213 bytes
//! ```
//!
//! The header names the asset and where it landed; indented lines trace it
//! back to the source. With `--json` the same report is printed as one JSON
//! object per asset instead.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure, with no I/O.

use crate::pipeline::AssetReport;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format one finished asset.
pub fn format_report(report: &AssetReport) -> Vec<String> {
    vec![
        format!("{} → {}", report.asset, report.output.display()),
        format!(
            "{}Source: {} ({})",
            indent(1),
            report.source.display(),
            report.source_dimensions
        ),
        format!("{}Crop: {} (centered)", indent(1), report.crop),
        format!(
            "{}Output: {}, {} bytes",
            indent(1),
            report.dimensions,
            report.bytes
        ),
    ]
}

/// Format several reports separated by a blank line.
pub fn format_reports(reports: &[AssetReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(format_report(report));
    }
    lines
}

/// Single-line JSON rendering of a report.
pub fn format_report_json(report: &AssetReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

pub fn print_reports(reports: &[AssetReport]) {
    for line in format_reports(reports) {
        println!("{}", line);
    }
}

pub fn print_reports_json(reports: &[AssetReport]) -> Result<(), serde_json::Error> {
    for report in reports {
        println!("{}", format_report_json(report)?);
    }
    Ok(())
}
