//! External process execution.
//!
//! Every host tool the loader stager touches goes through [`Cmd`]. Whether a
//! failure aborts the caller or is swallowed is decided by [`ExecMode`], set
//! per invocation rather than by separate helpers.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// How a command failure is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Spawn failures and non-zero exits are errors.
    #[default]
    Fatal,
    /// Failures are reported through [`CmdResult::success`] only.
    BestEffort,
}

/// Error raised by a [`Cmd`] running in [`ExecMode::Fatal`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully
    #[error("{message} (exit code {code:?}): {stderr}")]
    Failed {
        message: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Captured outcome of a command.
#[derive(Debug, Clone, Default)]
pub struct CmdResult {
    /// Exit code, `None` when killed by a signal or never started
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdResult {
    /// Whether the command ran and exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Builder for a single external command.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    mode: ExecMode,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            mode: ExecMode::Fatal,
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Select fatal or best-effort execution.
    pub fn mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for [`ExecMode::BestEffort`].
    pub fn allow_fail(self) -> Self {
        self.mode(ExecMode::BestEffort)
    }

    /// Message used when the command exits unsuccessfully.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// Command line as it would be typed, for logs and error messages.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run the command to completion, capturing its output.
    pub fn run(&self) -> Result<CmdResult, CommandError> {
        debug!(command = %self.display(), mode = ?self.mode, "running");

        let output = match Command::new(&self.program).args(&self.args).output() {
            Ok(output) => output,
            Err(source) => {
                return match self.mode {
                    ExecMode::Fatal => Err(CommandError::Spawn {
                        program: self.program.clone(),
                        source,
                    }),
                    ExecMode::BestEffort => {
                        debug!(
                            program = %self.program,
                            error = %source,
                            "ignored spawn failure"
                        );
                        Ok(CmdResult::default())
                    }
                };
            }
        };

        let result = CmdResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            match self.mode {
                ExecMode::Fatal => {
                    return Err(CommandError::Failed {
                        message: self
                            .error_msg
                            .clone()
                            .unwrap_or_else(|| format!("command failed: {}", self.display())),
                        code: result.code,
                        stderr: result.stderr.trim().to_string(),
                    });
                }
                ExecMode::BestEffort => {
                    debug!(command = %self.display(), code = ?result.code, "ignored failure");
                }
            }
        }

        Ok(result)
    }
}

/// Locate a program on `PATH`.
pub fn which(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Whether a program is available on `PATH`.
pub fn exists(program: &str) -> bool {
    which(program).is_some()
}
