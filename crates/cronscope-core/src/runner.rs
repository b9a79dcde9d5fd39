// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::{CronError, Result};

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Separator used to split output into lines.
pub const DEFAULT_LINE_SEPARATOR: &str = "\n";

/// Per-command limit used when none is configured.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// How a command's diagnostic (stderr) output is treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostics {
	/// Any stderr output is a hard failure.
	Reject,
	/// Stderr output replaces stdout as the payload and the result is
	/// flagged as diagnostic-sourced.
	AsPayload,
}

/// Output of a command that ran to completion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
	/// Payload split on the requested separator. Blank entries are kept.
	pub lines: Vec<String>,
	/// True when the payload came from stderr.
	pub from_diagnostic: bool,
	/// Exit status, or `None` when the process was terminated by a signal.
	pub exit_code: Option<i32>,
}

impl CommandOutput {
	/// Lines with blank entries removed.
	pub fn non_blank_lines(&self) -> impl Iterator<Item = &str> {
		self.lines
			.iter()
			.map(String::as_str)
			.filter(|line| !line.trim().is_empty())
	}
}

/// Runs one shell command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
	/// Runs `command`, splitting the payload on `separator`.
	///
	/// Launch failures, timeouts and rejected diagnostics are returned as
	/// errors; no output accompanies them.
	async fn run(
		&self,
		command: &str,
		diagnostics: Diagnostics,
		separator: &str,
	) -> Result<CommandOutput>;
}

/// [`CommandRunner`] that executes commands through a POSIX shell.
#[derive(Clone, Debug)]
pub struct ShellRunner {
	shell: PathBuf,
	timeout: Duration,
}

impl ShellRunner {
	pub fn new(shell: impl Into<PathBuf>, timeout: Duration) -> Self {
		Self {
			shell: shell.into(),
			timeout,
		}
	}

}

impl Default for ShellRunner {
	fn default() -> Self {
		Self::new(DEFAULT_SHELL, DEFAULT_COMMAND_TIMEOUT)
	}
}

#[async_trait]
impl CommandRunner for ShellRunner {
	async fn run(
		&self,
		command: &str,
		diagnostics: Diagnostics,
		separator: &str,
	) -> Result<CommandOutput> {
		trace!(shell = %self.shell.display(), command, "running shell command");

		let mut cmd = Command::new(&self.shell);
		cmd.arg("-c")
			.arg(command)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);
		// Own process group, so a timeout can stop every process in the
		// pipeline and not just the shell.
		#[cfg(unix)]
		cmd.process_group(0);

		let child = cmd.spawn().map_err(|source| CronError::Launch {
			command: command.to_string(),
			source,
		})?;
		let pid = child.id();

		let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
			Ok(Ok(output)) => output,
			Ok(Err(source)) => {
				return Err(CronError::Launch {
					command: command.to_string(),
					source,
				})
			}
			Err(_) => {
				if let Some(pid) = pid {
					kill_process_group(pid);
				}
				warn!(command, timeout = ?self.timeout, "command timed out, killed");
				return Err(CronError::Timeout {
					command: command.to_string(),
					timeout: self.timeout,
				});
			}
		};

		let stdout = String::from_utf8_lossy(&output.stdout);
		let stderr = String::from_utf8_lossy(&output.stderr);
		let exit_code = output.status.code();
		debug!(
			command,
			exit_code = ?exit_code,
			stdout_bytes = output.stdout.len(),
			stderr_bytes = output.stderr.len(),
			"command finished"
		);

		classify(command, &stdout, &stderr, exit_code, diagnostics, separator)
	}
}

/// Sends SIGKILL to the process group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
	let Ok(pgid) = i32::try_from(pid) else {
		return;
	};
	// SAFETY: kill(2) takes no pointers; a negative pid addresses the group.
	if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
		debug!(pid, error = %std::io::Error::last_os_error(), "failed to kill process group");
	}
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

/// Applies the stdout/stderr decision rule to a finished command.
pub fn classify(
	command: &str,
	stdout: &str,
	stderr: &str,
	exit_code: Option<i32>,
	diagnostics: Diagnostics,
	separator: &str,
) -> Result<CommandOutput> {
	if stderr.is_empty() {
		return Ok(CommandOutput {
			lines: split_lines(stdout, separator),
			from_diagnostic: false,
			exit_code,
		});
	}

	match diagnostics {
		Diagnostics::Reject => {
			warn!(command, stderr = %stderr.trim_end(), "command wrote to stderr");
			Err(CronError::Diagnostic {
				command: command.to_string(),
				stderr: stderr.trim_end().to_string(),
			})
		}
		Diagnostics::AsPayload => Ok(CommandOutput {
			lines: split_lines(stderr, separator),
			from_diagnostic: true,
			exit_code,
		}),
	}
}

/// Splits `text` on `separator`, falling back to a newline when the
/// separator is empty.
pub fn split_lines(text: &str, separator: &str) -> Vec<String> {
	let separator = if separator.is_empty() {
		DEFAULT_LINE_SEPARATOR
	} else {
		separator
	};
	text.split(separator).map(str::to_string).collect()
}
