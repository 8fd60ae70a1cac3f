use anyhow::{bail, Result};
use serde::Serialize;
use std::path::PathBuf;

use super::plural;
use crate::format::BlackFormatter;

#[derive(Debug, Serialize)]
pub struct FixResult {
    pub files: usize,
    pub failures: Vec<FixMessage>,
    pub warnings: Vec<FixMessage>,
}

#[derive(Debug, Serialize)]
pub struct FixMessage {
    pub path: PathBuf,
    pub message: String,
}

pub fn cmd_fix(
    formatter: &BlackFormatter,
    paths: &[PathBuf],
    keep_warnings: bool,
) -> Result<FixResult> {
    if paths.is_empty() {
        bail!("no files specified");
    }
    if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
        bail!("no such file: {}", missing.display());
    }

    let mut failures = Vec::new();
    let mut warnings = Vec::new();

    for (path, status) in formatter.format_files(paths, keep_warnings) {
        let message = status.error_message.unwrap_or_default();
        if status.ok {
            warnings.push(FixMessage { path, message });
        } else {
            tracing::info!(path = %path.display(), "failed to format");
            failures.push(FixMessage { path, message });
        }
    }

    Ok(FixResult {
        files: paths.len(),
        failures,
        warnings,
    })
}

pub fn format_fix_human(result: &FixResult) -> String {
    let mut lines = Vec::new();
    for warning in &result.warnings {
        lines.push(format!("warning: {}:", warning.path.display()));
        lines.extend(warning.message.lines().map(|l| format!("  {}", l)));
    }
    for failure in &result.failures {
        lines.push(format!("failed to format {}:", failure.path.display()));
        lines.extend(failure.message.lines().map(|l| format!("  {}", l)));
    }

    if result.failures.is_empty() {
        lines.push(format!("Formatted {}.", plural(result.files, "file")));
    } else {
        lines.push(format!(
            "Failed to format {} of {}.",
            result.failures.len(),
            plural(result.files, "file")
        ));
    }

    lines.join("\n")
}
