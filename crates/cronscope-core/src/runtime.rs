// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CronError, Result};
use crate::runner::{CommandRunner, Diagnostics, DEFAULT_LINE_SEPARATOR};
use crate::shell;

/// Container runtime collaborator: discovery and remote-exec command
/// construction.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
	/// Names of the currently running containers, in runtime order.
	async fn list_live_containers(&self) -> Result<Vec<String>>;

	/// Builds the command that runs `command` inside container `name`.
	/// String construction only; nothing is executed.
	fn wrap_command(&self, name: &str, command: &str) -> String;
}

/// [`ContainerRuntime`] backed by the docker CLI.
///
/// `binary` is inserted into commands verbatim, so it may carry a prefix
/// such as `sudo docker`.
#[derive(Clone)]
pub struct DockerRuntime {
	binary: String,
	runner: Arc<dyn CommandRunner>,
}

impl DockerRuntime {
	pub fn new(binary: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
		Self {
			binary: binary.into(),
			runner,
		}
	}

	fn list_command(&self) -> String {
		format!("{} ps --format '{{{{.Names}}}}'", self.binary)
	}
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
	async fn list_live_containers(&self) -> Result<Vec<String>> {
		let command = self.list_command();
		let output = self
			.runner
			.run(&command, Diagnostics::Reject, DEFAULT_LINE_SEPARATOR)
			.await
			.map_err(|e| CronError::Discovery(Box::new(e)))?;

		let names: Vec<String> = output
			.non_blank_lines()
			.map(|name| name.trim().to_string())
			.collect();
		debug!(count = names.len(), "discovered live containers");
		Ok(names)
	}

	fn wrap_command(&self, name: &str, command: &str) -> String {
		format!(
			"{} exec {} sh -c {}",
			self.binary,
			shell::quote(name),
			shell::quote(command)
		)
	}
}
