// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Reading a single target's job table.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::runner::{CommandOutput, CommandRunner, Diagnostics, DEFAULT_LINE_SEPARATOR};
use crate::runtime::ContainerRuntime;
use crate::target::ExecutionTarget;

/// Prefix of the message cron prints on stderr when a user has no table.
pub const NO_TABLE_SIGNAL: &str = "no crontab for";

/// Returns true when every non-blank line is the "no table configured"
/// message. An empty iterator does not count as the signal.
pub fn is_no_table_signal<'a>(lines: impl IntoIterator<Item = &'a str>) -> bool {
	let mut seen = false;
	for line in lines {
		if !line.trim_start().to_ascii_lowercase().starts_with(NO_TABLE_SIGNAL) {
			return false;
		}
		seen = true;
	}
	seen
}

/// Job inventory for one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CronReport {
	pub target: ExecutionTarget,
	pub count: usize,
	pub cron_jobs: Vec<String>,
	/// False when the listing could not be trusted, so a zero count does
	/// not mean the table is empty.
	pub trusted: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl CronReport {
	/// Report for a target whose listing could not be run at all.
	pub fn failed(target: ExecutionTarget, error: impl Into<String>) -> Self {
		Self {
			target,
			count: 0,
			cron_jobs: Vec::new(),
			trusted: false,
			error: Some(error.into()),
		}
	}

	/// Builds a report from a completed listing.
	pub fn from_output(target: ExecutionTarget, output: &CommandOutput) -> Self {
		let lines: Vec<String> = output.non_blank_lines().map(str::to_string).collect();

		if !output.from_diagnostic {
			return Self {
				target,
				count: lines.len(),
				cron_jobs: lines,
				trusted: true,
				error: None,
			};
		}

		if is_no_table_signal(lines.iter().map(String::as_str)) {
			return Self {
				target,
				count: 0,
				cron_jobs: Vec::new(),
				trusted: true,
				error: None,
			};
		}

		// Unrecognised stderr: keep it visible but do not count it as jobs.
		Self {
			target,
			count: 0,
			error: Some(lines.join("\n")),
			cron_jobs: lines,
			trusted: false,
		}
	}
}

/// Queries job tables through a [`CommandRunner`].
#[derive(Clone)]
pub struct CronInventory {
	runner: Arc<dyn CommandRunner>,
	runtime: Arc<dyn ContainerRuntime>,
	crontab: String,
}

impl CronInventory {
	pub fn new(
		runner: Arc<dyn CommandRunner>,
		runtime: Arc<dyn ContainerRuntime>,
		crontab: impl Into<String>,
	) -> Self {
		Self {
			runner,
			runtime,
			crontab: crontab.into(),
		}
	}

	/// Command printing the invoking context's table.
	pub fn list_command(&self) -> String {
		format!("{} -l", self.crontab)
	}

	pub async fn list_crons(&self, target: &ExecutionTarget) -> CronReport {
		let command = target.wrap(self.runtime.as_ref(), &self.list_command());
		debug!(target = %target, command = %command, "listing cron jobs");

		match self
			.runner
			.run(&command, Diagnostics::AsPayload, DEFAULT_LINE_SEPARATOR)
			.await
		{
			Ok(output) => {
				let report = CronReport::from_output(target.clone(), &output);
				debug!(
					target = %target,
					count = report.count,
					trusted = report.trusted,
					"listed cron jobs"
				);
				report
			}
			Err(e) => {
				warn!(target = %target, error = %e, "failed to list cron jobs");
				CronReport::failed(target.clone(), e.to_string())
			}
		}
	}
}
