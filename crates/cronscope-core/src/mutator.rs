// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Read-modify-write edits of job tables.
//!
//! Every edit is two commands: the current table is read and checked,
//! the new text is built here, and only then is it installed. A read that
//! cannot be trusted leaves the table untouched. Nothing guards the cycle
//! against concurrent writers, so callers must ensure a single writer per
//! table.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CronError, Result};
use crate::inventory::is_no_table_signal;
use crate::runner::{CommandOutput, CommandRunner, Diagnostics, DEFAULT_LINE_SEPARATOR};
use crate::shell;
use crate::target::ExecutionTarget;

/// Result of a mutation against one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationStatus {
	Applied,
	Skipped { reason: String },
	Failed { error: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
	pub target: ExecutionTarget,
	#[serde(flatten)]
	pub status: MutationStatus,
}

impl MutationOutcome {
	pub fn is_applied(&self) -> bool {
		self.status == MutationStatus::Applied
	}
}

/// Returns the reason a target is not eligible for mutation, if any.
pub fn ineligibility(target: &ExecutionTarget) -> Option<&'static str> {
	if target.is_host() {
		None
	} else {
		Some("container job tables are read-only")
	}
}

/// Alternation of literal substrings. A line matches when it contains any
/// alternative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternFilter {
	alternatives: Vec<String>,
}

impl PatternFilter {
	pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
		if patterns.is_empty() {
			return Err(CronError::EmptyPatterns);
		}

		let alternatives = patterns
			.iter()
			.map(|pattern| {
				let pattern = pattern.as_ref();
				// A blank alternative would match every line.
				if pattern.trim().is_empty() || pattern.contains(&['\n', '\r'][..]) {
					Err(CronError::InvalidPattern(pattern.to_string()))
				} else {
					Ok(pattern.to_string())
				}
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { alternatives })
	}

	pub fn matches(&self, line: &str) -> bool {
		self.alternatives
			.iter()
			.any(|alternative| line.contains(alternative.as_str()))
	}

	/// Lines not matched by the filter, in their original order.
	pub fn retain(&self, lines: &[String]) -> Vec<String> {
		lines
			.iter()
			.filter(|line| !self.matches(line))
			.cloned()
			.collect()
	}
}

fn validate_jobs<S: AsRef<str>>(jobs: &[S]) -> Result<Vec<String>> {
	if jobs.is_empty() {
		return Err(CronError::EmptyJobs);
	}
	jobs.iter()
		.map(|job| {
			let job = job.as_ref();
			if job.trim().is_empty() || job.contains(&['\n', '\r'][..]) {
				Err(CronError::InvalidJobLine(job.to_string()))
			} else {
				Ok(job.to_string())
			}
		})
		.collect()
}

/// Current table lines followed by `jobs`.
pub fn append_jobs(current: &[String], jobs: &[String]) -> Vec<String> {
	current.iter().chain(jobs).cloned().collect()
}

/// Interprets a listing taken before an edit.
///
/// Returns the table's lines, blank ones included, or the reason the
/// listing cannot be edited safely.
fn read_table(output: CommandOutput) -> std::result::Result<Vec<String>, String> {
	if output.from_diagnostic {
		if is_no_table_signal(output.non_blank_lines()) {
			return Ok(Vec::new());
		}
		let text = output.non_blank_lines().collect::<Vec<_>>().join("\n");
		return Err(if text.is_empty() {
			"unexpected diagnostic output".to_string()
		} else {
			text
		});
	}

	match output.exit_code {
		Some(0) => {
			let mut lines = output.lines;
			// A terminating newline leaves one empty entry behind.
			if lines.last().is_some_and(|line| line.is_empty()) {
				lines.pop();
			}
			Ok(lines)
		}
		Some(code) => Err(format!("listing exited with status {code}")),
		None => Err("listing terminated by signal".to_string()),
	}
}

fn install_status(result: Result<CommandOutput>) -> MutationStatus {
	match result {
		Ok(output) => match output.exit_code {
			Some(0) => MutationStatus::Applied,
			Some(code) => MutationStatus::Failed {
				error: format!("install exited with status {code}"),
			},
			None => MutationStatus::Failed {
				error: "install terminated by signal".to_string(),
			},
		},
		Err(e) => MutationStatus::Failed {
			error: e.to_string(),
		},
	}
}

/// Applies additive and subtractive edits to job tables.
#[derive(Clone)]
pub struct CronMutator {
	runner: Arc<dyn CommandRunner>,
	crontab: String,
}

impl CronMutator {
	pub fn new(runner: Arc<dyn CommandRunner>, crontab: impl Into<String>) -> Self {
		Self {
			runner,
			crontab: crontab.into(),
		}
	}

	pub fn list_command(&self) -> String {
		format!("{} -l", self.crontab)
	}

	/// Command replacing the whole table with `lines`.
	pub fn install_command(&self, lines: &[String]) -> String {
		if lines.is_empty() {
			return format!("{} - < /dev/null", self.crontab);
		}
		let quoted: Vec<String> = lines.iter().map(|line| shell::quote(line)).collect();
		format!("printf '%s\\n' {} | {} -", quoted.join(" "), self.crontab)
	}

	/// Appends `jobs` to every eligible target's table, keeping existing
	/// lines.
	pub async fn set_crons<S: AsRef<str>>(
		&self,
		targets: &[ExecutionTarget],
		jobs: &[S],
	) -> Result<Vec<MutationOutcome>> {
		let jobs = validate_jobs(jobs)?;
		Ok(self
			.apply("set", targets, |current| append_jobs(current, &jobs))
			.await)
	}

	/// Removes lines containing any of `patterns` from every eligible
	/// target's table.
	pub async fn delete_crons<S: AsRef<str>>(
		&self,
		targets: &[ExecutionTarget],
		patterns: &[S],
	) -> Result<Vec<MutationOutcome>> {
		let filter = PatternFilter::new(patterns)?;
		Ok(self
			.apply("delete", targets, |current| filter.retain(current))
			.await)
	}

	async fn apply<F>(
		&self,
		operation: &'static str,
		targets: &[ExecutionTarget],
		edit: F,
	) -> Vec<MutationOutcome>
	where
		F: Fn(&[String]) -> Vec<String> + Send + Sync,
	{
		let mut outcomes = Vec::with_capacity(targets.len());

		for target in targets {
			let status = match ineligibility(target) {
				Some(reason) => {
					debug!(operation, target = %target, reason, "skipping cron mutation");
					MutationStatus::Skipped {
						reason: reason.to_string(),
					}
				}
				None => self.edit_table(&edit).await,
			};

			match &status {
				MutationStatus::Failed { error } => {
					warn!(operation, target = %target, error = %error, "cron mutation failed")
				}
				MutationStatus::Applied => info!(operation, target = %target, "cron mutation applied"),
				MutationStatus::Skipped { .. } => {}
			}

			outcomes.push(MutationOutcome {
				target: target.clone(),
				status,
			});
		}

		outcomes
	}

	async fn edit_table<F>(&self, edit: &F) -> MutationStatus
	where
		F: Fn(&[String]) -> Vec<String> + Send + Sync,
	{
		let listed = self
			.runner
			.run(&self.list_command(), Diagnostics::AsPayload, DEFAULT_LINE_SEPARATOR)
			.await;
		let current = match listed.map_err(|e| e.to_string()).and_then(read_table) {
			Ok(lines) => lines,
			Err(error) => {
				return MutationStatus::Failed {
					error: format!("table left unchanged: {error}"),
				}
			}
		};

		let edited = edit(current.as_slice());
		if edited == current {
			debug!(lines = current.len(), "cron table unchanged, skipping install");
			return MutationStatus::Applied;
		}

		debug!(before = current.len(), after = edited.len(), "installing cron table");
		let installed = self
			.runner
			.run(
				&self.install_command(&edited),
				Diagnostics::Reject,
				DEFAULT_LINE_SEPARATOR,
			)
			.await;
		install_status(installed)
	}
}
