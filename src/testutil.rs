#![cfg(test)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

use crate::tool::{Invocation, ToolError, ToolOutput, ToolRunner};

pub const SOURCE_NAME: &str = "python_test_data.py";
pub const GOLDEN_NAME: &str = "python_test_data_golden.py";
pub const MALFORMED_NAME: &str = "malformed_file.txt";
pub const BLACK_CONFIG_NAME: &str = "black_config.toml";

const BLACK_PARSE_ERROR_EXIT: i32 = 123;

pub fn testdata_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}

fn read_testdata(name: &str) -> Vec<u8> {
    std::fs::read(testdata_path(name)).expect("failed to read test data")
}

pub fn source_bytes() -> Vec<u8> {
    read_testdata(SOURCE_NAME)
}

pub fn golden_bytes() -> Vec<u8> {
    read_testdata(GOLDEN_NAME)
}

pub fn malformed_bytes() -> Vec<u8> {
    read_testdata(MALFORMED_NAME)
}

pub fn black_config_path() -> PathBuf {
    testdata_path(BLACK_CONFIG_NAME)
}

pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_fixture(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write fixture");
        path
    }
}

/// Ordered record of every command line a [`CapturingToolRunner`] saw.
/// Clones share the same history.
#[derive(Clone, Default)]
pub struct CommandHistory(Rc<RefCell<VecDeque<String>>>);

impl CommandHistory {
    pub fn pop_front(&self) -> Option<String> {
        self.0.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn push(&self, command: String) {
        self.0.borrow_mut().push_back(command);
    }
}

type Responder = Box<dyn Fn(&Invocation<'_>) -> Result<ToolOutput, ToolError>>;

/// Records each invocation's command line, then answers it with a canned
/// responder instead of spawning anything.
pub struct CapturingToolRunner {
    history: CommandHistory,
    responder: Responder,
}

impl CapturingToolRunner {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<ToolOutput, ToolError> + 'static,
    {
        Self {
            history: CommandHistory::default(),
            responder: Box::new(responder),
        }
    }

    pub fn fake_black() -> Self {
        let black = FakeBlack::new();
        Self::new(move |inv| Ok(black.respond(inv)))
    }

    pub fn command_history(&self) -> CommandHistory {
        self.history.clone()
    }
}

impl ToolRunner for CapturingToolRunner {
    fn run(&self, invocation: &Invocation<'_>) -> Result<ToolOutput, ToolError> {
        self.history.push(invocation.command_line());
        (self.responder)(invocation)
    }
}

/// Stands in for black over the fixtures in `testdata/`: the source fixture
/// formats to the golden file, the golden file formats to itself, and
/// anything else fails to parse.
pub struct FakeBlack {
    source: Vec<u8>,
    golden: Vec<u8>,
}

impl FakeBlack {
    pub fn new() -> Self {
        Self {
            source: source_bytes(),
            golden: golden_bytes(),
        }
    }

    fn format(&self, input: &[u8]) -> Option<Vec<u8>> {
        if input == self.source.as_slice() || input == self.golden.as_slice() {
            Some(self.golden.clone())
        } else {
            None
        }
    }

    fn parse_error(name: &str, input: &[u8]) -> String {
        let first_line = String::from_utf8_lossy(input)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        format!("error: cannot format {}: Cannot parse: 1:0: {}\n", name, first_line)
    }

    pub fn respond(&self, invocation: &Invocation<'_>) -> ToolOutput {
        let args = invocation.args();
        let files = match args.iter().position(|a| a.as_os_str() == OsStr::new("-q")) {
            Some(i) => &args[i + 1..],
            None => args,
        };

        if files.len() == 1 && files[0].as_os_str() == OsStr::new("-") {
            let input = invocation.stdin().unwrap_or_default();
            return match self.format(input) {
                Some(formatted) => ToolOutput {
                    status: Some(0),
                    stdout: formatted,
                    stderr: Vec::new(),
                },
                None => ToolOutput {
                    status: Some(BLACK_PARSE_ERROR_EXIT),
                    stdout: Vec::new(),
                    stderr: Self::parse_error("-", input).into_bytes(),
                },
            };
        }

        let mut stderr = String::new();
        for file in files {
            let path = Path::new(file);
            let input = std::fs::read(path).expect("fake black: failed to read file");
            match self.format(&input) {
                Some(formatted) => {
                    if formatted != input {
                        std::fs::write(path, formatted).expect("fake black: failed to write file");
                    }
                }
                None => stderr.push_str(&Self::parse_error(&path.display().to_string(), &input)),
            }
        }

        ToolOutput {
            status: Some(if stderr.is_empty() {
                0
            } else {
                BLACK_PARSE_ERROR_EXIT
            }),
            stdout: Vec::new(),
            stderr: stderr.into_bytes(),
        }
    }
}

#[test]
fn capturing_runner_records_in_order() {
    let runner = CapturingToolRunner::new(|_| {
        Ok(ToolOutput {
            status: Some(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    });
    let history = runner.command_history();

    let first = Invocation::new("black", vec!["-q".into(), "-".into()]);
    let second = Invocation::new("black", vec!["-q".into(), "a.py".into()]);
    runner.run(&first).unwrap();
    runner.run(&second).unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history.pop_front().unwrap(), "black -q -");
    assert_eq!(history.pop_front().unwrap(), "black -q a.py");
    assert!(history.pop_front().is_none());
}
