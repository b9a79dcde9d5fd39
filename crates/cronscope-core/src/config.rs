// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::time::Duration;

use crate::aggregator::EmptyTablePolicy;
use crate::runner::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_SHELL};

/// Settings shared by every component of a [`CronService`](crate::CronService).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CronConfig {
	/// Shell used to run every command.
	pub shell: PathBuf,
	/// Cron table tool, inserted into commands verbatim.
	pub crontab_bin: String,
	/// Container runtime CLI, inserted into commands verbatim.
	pub docker_bin: String,
	/// Upper bound for any single command.
	pub command_timeout: Duration,
	pub empty_tables: EmptyTablePolicy,
}

impl Default for CronConfig {
	fn default() -> Self {
		Self {
			shell: PathBuf::from(DEFAULT_SHELL),
			crontab_bin: "crontab".to_string(),
			docker_bin: "docker".to_string(),
			command_timeout: DEFAULT_COMMAND_TIMEOUT,
			empty_tables: EmptyTablePolicy::default(),
		}
	}
}
