//! External command execution utilities.
//!
//! Builder-based API for running the external transforms (template
//! renderer, Sass compiler) with stdin piping and filtered stderr logging.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Compile to stdout
//! let output = Cmd::from_slice(&["sass"])
//!     .args(["--no-source-map", "main.sass"])
//!     .run()?;
//!
//! // With stdin piping
//! let output = Cmd::new("pug").arg("--pretty").stdin(template).run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::{ErrorKind, Write},
    path::PathBuf,
    process::{Command, Output, Stdio},
    sync::LazyLock,
    thread,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    stdin_data: Option<Vec<u8>>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["sass"]` or `["npx", "pug"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        match cmd.split_first() {
            Some((program, args)) => Self::new(program).args(args),
            None => Self::default(),
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command and return output. A non-zero exit is an error
    /// carrying the command's stderr.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))?;

        // stdin is fed from its own thread while stdout/stderr drain here
        let writer = match (self.stdin_data, child.stdin.take()) {
            (Some(data), Some(mut stdin)) => {
                Some(thread::spawn(move || stdin.write_all(&data)))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for `{name}`"))?;

        log_output(&name, &output, filter)?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // exited successfully without reading all input
                Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => {
                    return Err(e).with_context(|| format!("Failed to write stdin to `{name}`"));
                }
                Err(_) => anyhow::bail!("stdin writer for `{name}` panicked"),
            }
        }
        Ok(output)
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

/// Check that the program of a command array is on `PATH`.
pub fn require_program<S: AsRef<OsStr>>(cmd: &[S]) -> Result<PathBuf> {
    let program = cmd
        .first()
        .map(AsRef::as_ref)
        .context("empty command")?;
    which::which(program).with_context(|| {
        format!(
            "`{}` not found in PATH, install it or set the command in kiln.toml",
            program.to_string_lossy()
        )
    })
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Skips known noise (deprecation notices) when echoing stderr.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                !self.should_skip(plain.trim())
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"));
    RE.replace_all(s, "")
}

/// Log command output, returning error on failure.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        anyhow::bail!(format_error(name, output));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

/// Format error message for failed command: stderr, or stdout when the
/// tool reports errors there.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let detail = match stderr.trim() {
        "" => stdout.trim(),
        err => err,
    };

    let mut msg = format!("`{name}` failed with {}", output.status);
    if !detail.is_empty() {
        msg.push('\n');
        msg.push_str(&strip_ansi(detail));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::from_slice(&["npx", "sass"])
            .arg("main.sass")
            .args(["--load-path", "src"]);

        assert_eq!(cmd.program, OsString::from("npx"));
        assert_eq!(cmd.args.len(), 4);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["Deprecation Warning", "More info"]);
        assert!(filter.should_skip("Deprecation Warning: slash-div"));
        assert!(!filter.should_skip("Error: expected \"}\""));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_stdin_pipe() {
        let output = Cmd::new("cat").stdin(b"test data").run().unwrap();
        assert_eq!(output.stdout, b"test data");
    }

    #[test]
    fn test_stdin_larger_than_pipe_buffer() {
        let data = vec![b'x'; 1 << 20];
        let output = Cmd::new("cat").stdin(&data).run().unwrap();
        assert_eq!(output.stdout.len(), data.len());
    }

    #[test]
    fn test_failure_carries_stderr() {
        let err = Cmd::from_slice(&["sh", "-c", "echo boom >&2; exit 3"])
            .run()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`sh` failed"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_require_missing_program() {
        let err = require_program(&["kiln-no-such-tool"]).unwrap_err();
        assert!(err.to_string().contains("not found in PATH"));
    }
}
