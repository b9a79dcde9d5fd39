// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for crontab inventory and mutation.

use std::time::Duration;

use thiserror::Error;

use crate::target::ExecutionTarget;

/// Result type for cronscope operations.
pub type Result<T> = std::result::Result<T, CronError>;

/// Errors that can occur while inspecting or editing job tables.
#[derive(Debug, Error)]
pub enum CronError {
	#[error("failed to run `{command}`: {source}")]
	Launch {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("`{command}` timed out after {timeout:?}")]
	Timeout { command: String, timeout: Duration },

	#[error("`{command}` reported: {stderr}")]
	Diagnostic { command: String, stderr: String },

	#[error("container discovery failed: {0}")]
	Discovery(#[source] Box<CronError>),

	#[error("at least one pattern is required")]
	EmptyPatterns,

	#[error("invalid pattern: {0:?}")]
	InvalidPattern(String),

	#[error("at least one cron job is required")]
	EmptyJobs,

	#[error("invalid cron job line: {0:?}")]
	InvalidJobLine(String),

	#[error("untrusted report for {target}: {reason}")]
	Untrusted {
		target: ExecutionTarget,
		reason: String,
	},
}

impl CronError {
	/// Returns true for errors produced before any command was built.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			CronError::EmptyPatterns
				| CronError::InvalidPattern(_)
				| CronError::EmptyJobs
				| CronError::InvalidJobLine(_)
		)
	}
}
