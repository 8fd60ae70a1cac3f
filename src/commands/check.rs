use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use super::plural;
use crate::format::{BlackFormatter, CheckOutcome};

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub files: Vec<FileCheck>,
}

#[derive(Debug, Serialize)]
pub struct FileCheck {
    pub path: PathBuf,
    pub status: CheckStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum CheckStatus {
    Unchanged,
    WouldReformat,
    Error { message: String },
}

impl CheckResult {
    pub fn has_failures(&self) -> bool {
        self.files
            .iter()
            .any(|f| !matches!(f.status, CheckStatus::Unchanged))
    }

    fn count(&self, pred: fn(&CheckStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

pub fn cmd_check(formatter: &BlackFormatter, paths: &[PathBuf]) -> Result<CheckResult> {
    if paths.is_empty() {
        bail!("no files specified");
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let status = match formatter.check_file(path, &contents) {
            CheckOutcome::Unchanged => CheckStatus::Unchanged,
            CheckOutcome::Reformat { formatted } => {
                tracing::debug!(
                    path = %path.display(),
                    before = contents.len(),
                    after = formatted.len(),
                    "would reformat"
                );
                CheckStatus::WouldReformat
            }
            CheckOutcome::Failed { message } => CheckStatus::Error { message },
        };
        files.push(FileCheck {
            path: path.clone(),
            status,
        });
    }

    Ok(CheckResult { files })
}

pub fn format_check_human(result: &CheckResult) -> String {
    let mut lines = Vec::new();
    for file in &result.files {
        match &file.status {
            CheckStatus::Unchanged => {}
            CheckStatus::WouldReformat => {
                lines.push(format!("would reformat {}", file.path.display()));
            }
            CheckStatus::Error { message } => {
                lines.push(format!("failed to format {}:", file.path.display()));
                lines.extend(message.lines().map(|l| format!("  {}", l)));
            }
        }
    }

    let reformat = result.count(|s| matches!(s, CheckStatus::WouldReformat));
    let unchanged = result.count(|s| matches!(s, CheckStatus::Unchanged));
    let failed = result.count(|s| matches!(s, CheckStatus::Error { .. }));

    let mut summary = Vec::new();
    if reformat > 0 {
        summary.push(format!("{} would be reformatted", plural(reformat, "file")));
    }
    if unchanged > 0 {
        summary.push(format!("{} would be left unchanged", plural(unchanged, "file")));
    }
    if failed > 0 {
        summary.push(format!("{} would fail to format", plural(failed, "file")));
    }
    lines.push(format!("{}.", summary.join(", ")));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        black_config_path, golden_bytes, malformed_bytes, source_bytes, CapturingToolRunner,
        TestEnv,
    };

    fn formatter() -> BlackFormatter {
        BlackFormatter::new(Some(black_config_path())).with_runner(CapturingToolRunner::fake_black())
    }

    #[test]
    fn cmd_check_classifies_each_file() {
        let env = TestEnv::new();
        let golden = env.write_fixture("golden.py", &golden_bytes());
        let source = env.write_fixture("source.py", &source_bytes());
        let malformed = env.write_fixture("malformed.py", &malformed_bytes());

        let result = cmd_check(&formatter(), &[golden, source.clone(), malformed]).unwrap();
        assert_eq!(result.files.len(), 3);
        assert!(matches!(result.files[0].status, CheckStatus::Unchanged));
        assert!(matches!(result.files[1].status, CheckStatus::WouldReformat));
        assert!(matches!(
            &result.files[2].status,
            CheckStatus::Error { message } if message.starts_with("error: cannot format")
        ));
        assert!(result.has_failures());

        // Checking never writes.
        assert_eq!(std::fs::read(&source).unwrap(), source_bytes());
    }

    #[test]
    fn cmd_check_all_formatted_has_no_failures() {
        let env = TestEnv::new();
        let golden = env.write_fixture("golden.py", &golden_bytes());

        let result = cmd_check(&formatter(), &[golden]).unwrap();
        assert!(!result.has_failures());
        assert_eq!(format_check_human(&result), "1 file would be left unchanged.");
    }

    #[test]
    fn cmd_check_missing_file_errors() {
        let env = TestEnv::new();
        let missing = env.path().join("missing.py");
        let err = cmd_check(&formatter(), &[missing]).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn cmd_check_empty_errors() {
        assert!(cmd_check(&formatter(), &[]).is_err());
    }

    #[test]
    fn format_check_human_lists_problems_and_summary() {
        let result = CheckResult {
            files: vec![
                FileCheck {
                    path: PathBuf::from("a.py"),
                    status: CheckStatus::WouldReformat,
                },
                FileCheck {
                    path: PathBuf::from("b.py"),
                    status: CheckStatus::Unchanged,
                },
                FileCheck {
                    path: PathBuf::from("c.py"),
                    status: CheckStatus::Error {
                        message: "error: cannot format -: Cannot parse: 1:4".to_string(),
                    },
                },
            ],
        };
        let text = format_check_human(&result);
        assert_eq!(
            text,
            "would reformat a.py\n\
             failed to format c.py:\n  error: cannot format -: Cannot parse: 1:4\n\
             1 file would be reformatted, 1 file would be left unchanged, 1 file would fail to format."
        );
    }

    #[test]
    fn check_result_serializes_with_tagged_status() {
        let result = CheckResult {
            files: vec![FileCheck {
                path: PathBuf::from("a.py"),
                status: CheckStatus::WouldReformat,
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["files"][0]["path"], "a.py");
        assert_eq!(json["files"][0]["status"]["type"], "WouldReformat");
    }
}
