// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CronError, Result};
use crate::runner::{CommandOutput, CommandRunner, Diagnostics};
use crate::runtime::ContainerRuntime;

/// Replays canned results and records every command it was given.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
	responses: Mutex<VecDeque<Result<CommandOutput>>>,
	commands: Mutex<Vec<(String, Diagnostics)>>,
}

impl ScriptedRunner {
	pub(crate) fn push_stdout(&self, text: &str) {
		self.push(Ok(CommandOutput {
			lines: text.split('\n').map(str::to_string).collect(),
			from_diagnostic: false,
			exit_code: Some(0),
		}));
	}

	pub(crate) fn push_stderr(&self, text: &str) {
		self.push(Ok(CommandOutput {
			lines: text.split('\n').map(str::to_string).collect(),
			from_diagnostic: true,
			exit_code: Some(1),
		}));
	}

	pub(crate) fn push(&self, result: Result<CommandOutput>) {
		self.responses.lock().unwrap().push_back(result);
	}

	pub(crate) fn commands(&self) -> Vec<String> {
		self.commands
			.lock()
			.unwrap()
			.iter()
			.map(|(command, _)| command.clone())
			.collect()
	}

	pub(crate) fn diagnostics(&self) -> Vec<Diagnostics> {
		self.commands.lock().unwrap().iter().map(|(_, d)| *d).collect()
	}
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
	async fn run(
		&self,
		command: &str,
		diagnostics: Diagnostics,
		_separator: &str,
	) -> Result<CommandOutput> {
		self.commands
			.lock()
			.unwrap()
			.push((command.to_string(), diagnostics));
		self.responses
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Ok(CommandOutput::default()))
	}
}

/// Runtime that wraps commands with a recognisable prefix and reports a
/// fixed container list, or a discovery failure for `None`.
pub(crate) struct StaticRuntime(pub(crate) Option<Vec<String>>);

#[async_trait]
impl ContainerRuntime for StaticRuntime {
	async fn list_live_containers(&self) -> Result<Vec<String>> {
		self.0.clone().ok_or_else(|| {
			CronError::Discovery(Box::new(CronError::Diagnostic {
				command: "ps".to_string(),
				stderr: "Cannot connect to the Docker daemon".to_string(),
			}))
		})
	}

	fn wrap_command(&self, name: &str, command: &str) -> String {
		format!("exec[{name}] {command}")
	}
}
