// src/exec.rs

//! External command execution
//!
//! Runs a command to completion with stdout and stderr captured into
//! separate buffers. `LC_ALL=C` is forced on the child so that any textual
//! output is parsed independently of the caller's locale.
//!
//! Exit code 0 is always a success. Any other code must be listed in the
//! caller's allow-list, otherwise the run fails with an [`ExecuteError`]
//! carrying the command, the code and the captured output. No retry is
//! attempted and no timeout is applied.

use crate::error::{Error, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Exit code that is treated as success regardless of the allow-list
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code reported when the child was terminated by a signal
const EXIT_SIGNALED: i32 = -1;

/// A command ran but exited with a code outside its allow-list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Command '{}' returned {exit_code}: {}",
    .command.join(" "),
    String::from_utf8_lossy(.output)
)]
pub struct ExecuteError {
    /// Executable followed by its arguments
    pub command: Vec<String>,
    pub exit_code: i32,
    /// stderr, or stdout when stderr was empty, without the trailing newline
    pub output: Vec<u8>,
}

impl ExecuteError {
    /// Captured output as text
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Execute a command and return its stdout
///
/// The trailing newline is stripped from the returned output. With `quiet`
/// set, the output is still captured for logging but an empty buffer is
/// returned on success.
pub fn execute<S: AsRef<str>>(
    command: &[S],
    quiet: bool,
    valid_exit_codes: &[i32],
) -> Result<Vec<u8>> {
    let command: Vec<String> = command.iter().map(|s| s.as_ref().to_string()).collect();
    let Some((program, args)) = command.split_first() else {
        return Err(Error::Spawn {
            command: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    debug!("Executing: {:?} Quiet: {}", command, quiet);

    let output = Command::new(program)
        .args(args)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .output()
        .map_err(|source| Error::Spawn {
            command: command.join(" "),
            source,
        })?;

    let exit_code = output.status.code().unwrap_or(EXIT_SIGNALED);
    debug!("Return code: {}", exit_code);
    if !output.stdout.is_empty() {
        debug!("Output: {}", String::from_utf8_lossy(&output.stdout));
    }
    if !output.stderr.is_empty() {
        debug!("Error: {}", String::from_utf8_lossy(&output.stderr));
    }

    if exit_code != EXIT_SUCCESS && !valid_exit_codes.contains(&exit_code) {
        // Some tools write diagnostics to stdout when asked for structured output
        let mut captured = if output.stderr.is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        strip_trailing_newline(&mut captured);
        return Err(ExecuteError {
            command,
            exit_code,
            output: captured,
        }
        .into());
    }

    if quiet {
        return Ok(Vec::new());
    }

    let mut stdout = output.stdout;
    strip_trailing_newline(&mut stdout);
    Ok(stdout)
}

/// Remove a single trailing `\n`, if present
fn strip_trailing_newline(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
}
