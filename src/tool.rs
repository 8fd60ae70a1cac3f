use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Output, Stdio};

use tracing::debug;

/// One external-process call: program, arguments, and optional stdin bytes.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    program: &'a str,
    args: Vec<OsString>,
    stdin: Option<&'a [u8]>,
}

impl<'a> Invocation<'a> {
    pub fn new(program: &'a str, args: Vec<OsString>) -> Self {
        Self {
            program,
            args,
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, stdin: Option<&'a [u8]>) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn program(&self) -> &str {
        self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin
    }

    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.program.to_string())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect()
    }

    /// Space-joined form of the invocation, as it would be typed in a shell
    /// without quoting.
    pub fn command_line(&self) -> String {
        self.tokens().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim_end().to_string()
    }

    pub fn status_display(&self) -> String {
        self.status
            .map_or("signal".to_string(), |c| format!("exit code {}", c))
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed to write stdin of {program}: {source}")]
    Stdin { program: String, source: io::Error },

    #[error("failed to wait for {program}: {source}")]
    Wait { program: String, source: io::Error },
}

pub trait ToolRunner {
    fn run(&self, invocation: &Invocation<'_>) -> Result<ToolOutput, ToolError>;
}

/// Runs invocations as real child processes, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

impl ToolRunner for SubprocessRunner {
    fn run(&self, invocation: &Invocation<'_>) -> Result<ToolOutput, ToolError> {
        let program = invocation.program().to_string();
        debug!(command = %invocation.command_line(), "spawning");

        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(if invocation.stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        // stdin is fed from a separate thread so a child that writes before
        // draining its input cannot deadlock on a full stdout pipe.
        let output = std::thread::scope(|scope| -> Result<Output, ToolError> {
            let writer = match (invocation.stdin(), child.stdin.take()) {
                (Some(input), Some(mut pipe)) => {
                    Some(scope.spawn(move || pipe.write_all(input)))
                }
                _ => None,
            };

            let output = child.wait_with_output().map_err(|source| ToolError::Wait {
                program: program.clone(),
                source,
            })?;

            if let Some(writer) = writer {
                let written = writer
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
                match written {
                    Ok(()) => {}
                    // The tool exited without reading all of its input; its
                    // exit status already says what happened.
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                    Err(source) => {
                        return Err(ToolError::Stdin {
                            program: program.clone(),
                            source,
                        })
                    }
                }
            }

            Ok(output)
        })?;

        let output = ToolOutput::from(output);
        debug!(
            program = %program,
            status = %output.status_display(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "finished"
        );
        Ok(output)
    }
}
