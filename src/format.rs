use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{BlackConfig, DEFAULT_BLACK_BINARY};
use crate::tool::{Invocation, SubprocessRunner, ToolOutput, ToolRunner};

/// Outcome of formatting a file's contents without touching the file.
///
/// A failed result never carries contents, and a successful one never
/// carries an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    ok: bool,
    formatted_contents: Vec<u8>,
    error_message: Option<String>,
}

impl FormatResult {
    pub fn success(formatted_contents: Vec<u8>) -> Self {
        Self {
            ok: true,
            formatted_contents,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "failure must carry a message");
        Self {
            ok: false,
            formatted_contents: Vec::new(),
            error_message: Some(message),
        }
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn formatted_contents(&self) -> &[u8] {
        &self.formatted_contents
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Outcome of fixing a file in place. A successful fix may still carry the
/// tool's warning output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixStatus {
    pub ok: bool,
    pub error_message: Option<String>,
}

impl FixStatus {
    pub fn success() -> Self {
        Self {
            ok: true,
            error_message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Unchanged,
    Reformat { formatted: Vec<u8> },
    Failed { message: String },
}

/// Adapter over the `black` command-line tool.
pub struct BlackFormatter {
    binary: String,
    config_file: Option<PathBuf>,
    flags: Vec<String>,
    runner: Box<dyn ToolRunner>,
}

impl BlackFormatter {
    pub fn new(config_file: Option<PathBuf>) -> Self {
        Self {
            binary: DEFAULT_BLACK_BINARY.to_string(),
            config_file,
            flags: Vec::new(),
            runner: Box::new(SubprocessRunner),
        }
    }

    pub fn from_config(config: &BlackConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            flags: config.flags.clone(),
            ..Self::new(config.config.clone())
        }
    }

    pub fn with_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    fn base_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(config) = &self.config_file {
            args.push(OsString::from("--config"));
            args.push(config.as_os_str().to_owned());
        }
        args.extend(self.flags.iter().map(OsString::from));
        args.push(OsString::from("-q"));
        args
    }

    fn run_tool(&self, args: Vec<OsString>, stdin: Option<&[u8]>) -> Result<ToolOutput, String> {
        let invocation = Invocation::new(&self.binary, args).with_stdin(stdin);
        debug!(command = %invocation.command_line(), "running formatter");
        self.runner.run(&invocation).map_err(|e| e.to_string())
    }

    fn failure_message(&self, output: &ToolOutput) -> String {
        let stderr = output.stderr_text();
        if stderr.is_empty() {
            format!("{} failed with {}", self.binary, output.status_display())
        } else {
            stderr
        }
    }

    /// Formats `contents` through the tool's stdin. `path` is only used for
    /// diagnostics.
    pub fn format_file_in_memory(&self, path: &Path, contents: &[u8]) -> FormatResult {
        let mut args = self.base_args();
        args.push(OsString::from("-"));

        match self.run_tool(args, Some(contents)) {
            Ok(output) if output.success() => {
                if !output.stderr.is_empty() {
                    warn!(path = %path.display(), "{}", output.stderr_text());
                }
                FormatResult::success(output.stdout)
            }
            Ok(output) => {
                debug!(path = %path.display(), status = %output.status_display(), "formatting failed");
                FormatResult::failure(self.failure_message(&output))
            }
            Err(message) => FormatResult::failure(message),
        }
    }

    /// Fixes a single file in place.
    pub fn format_file(&self, path: &Path) -> FixStatus {
        let mut args = self.base_args();
        args.push(path.as_os_str().to_owned());

        match self.run_tool(args, None) {
            Ok(output) if output.success() => {
                if output.stderr.is_empty() {
                    FixStatus::success()
                } else {
                    FixStatus::warning(output.stderr_text())
                }
            }
            Ok(output) => FixStatus::failure(self.failure_message(&output)),
            Err(message) => FixStatus::failure(message),
        }
    }

    /// Fixes all `paths` in place with a single invocation. If that fails,
    /// every file is retried on its own so errors land on the files that
    /// caused them. Only files with something to report are returned: failures,
    /// plus warnings when `keep_warnings` is set.
    pub fn format_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        keep_warnings: bool,
    ) -> Vec<(PathBuf, FixStatus)> {
        if paths.is_empty() {
            return Vec::new();
        }

        let mut args = self.base_args();
        args.extend(paths.iter().map(|p| p.as_ref().as_os_str().to_owned()));

        match self.run_tool(args, None) {
            Ok(output) if output.success() => {
                if !output.stderr.is_empty() {
                    warn!("{}", output.stderr_text());
                }
                return Vec::new();
            }
            Ok(output) => debug!(
                files = paths.len(),
                status = %output.status_display(),
                "batch failed, retrying files individually"
            ),
            Err(message) => debug!(
                files = paths.len(),
                error = %message,
                "batch failed, retrying files individually"
            ),
        }

        paths
            .iter()
            .filter_map(|path| {
                let path = path.as_ref();
                let status = self.format_file(path);
                if !status.ok || (keep_warnings && status.error_message.is_some()) {
                    Some((path.to_path_buf(), status))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Reports whether formatting would change `contents`.
    pub fn check_file(&self, path: &Path, contents: &[u8]) -> CheckOutcome {
        let result = self.format_file_in_memory(path, contents);
        if !result.ok() {
            return CheckOutcome::Failed {
                message: result.error_message().unwrap_or_default().to_string(),
            };
        }
        if result.formatted_contents() == contents {
            CheckOutcome::Unchanged
        } else {
            CheckOutcome::Reformat {
                formatted: result.formatted_contents().to_vec(),
            }
        }
    }
}
