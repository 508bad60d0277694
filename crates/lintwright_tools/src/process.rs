//! Subprocess execution for wrapped tools.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::error::ToolError;
use crate::reporter::Reporter;

/// Log target used for tool output lines.
pub const PROCESS_TARGET: &str = "lintwright::process";

const COMMAND_NOT_FOUND: i32 = 127;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

fn spawn_error(program: &str, error: std::io::Error) -> ToolError {
    if error.kind() == ErrorKind::NotFound {
        ToolError::CommandNotFound(program.to_string())
    } else {
        ToolError::Io(error)
    }
}

/// Fails with [`ToolError::CommandNotFound`] if `program` cannot be run.
pub fn check_command_installed(program: &str, args: &[&str]) -> Result<(), ToolError> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| spawn_error(program, e))?;

    if status.code() == Some(COMMAND_NOT_FOUND) {
        return Err(ToolError::CommandNotFound(program.to_string()));
    }
    Ok(())
}

fn pump<R: Read>(stream: R, name: &str, is_stderr: bool) -> String {
    let mut captured = String::new();
    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else { break };
        if is_stderr {
            warn!(target: PROCESS_TARGET, "[{}] {}", name, line);
        } else {
            info!(target: PROCESS_TARGET, "[{}] {}", name, line);
        }
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

/// Runs `argv` in `cwd`, streaming stdout and stderr into the log.
pub fn run(argv: &[String], cwd: &Path, reporter: &Reporter) -> Result<ProcessOutput, ToolError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ToolError::CommandNotFound(String::new()));
    };
    reporter.record_command(argv);

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let name = reporter.name();

    let (stdout, stderr) = std::thread::scope(|scope| {
        let err_handle = scope.spawn(|| stderr.map(|s| pump(s, name, true)).unwrap_or_default());
        let out = stdout.map(|s| pump(s, name, false)).unwrap_or_default();
        let err = err_handle.join().unwrap_or_default();
        (out, err)
    });

    let status = child.wait()?;
    Ok(ProcessOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}
