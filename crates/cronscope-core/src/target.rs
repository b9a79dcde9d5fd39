// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::ContainerRuntime;

/// A logical context in which commands run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ExecutionTarget {
	/// The machine the service runs on.
	Host,
	/// A running container, addressed by name.
	Container(String),
}

impl ExecutionTarget {
	pub fn container(name: impl Into<String>) -> Self {
		ExecutionTarget::Container(name.into())
	}

	pub fn is_host(&self) -> bool {
		matches!(self, ExecutionTarget::Host)
	}

	/// Returns the literal command that runs `base_command` inside this
	/// target. No existence check is made for containers.
	pub fn wrap(&self, runtime: &dyn ContainerRuntime, base_command: &str) -> String {
		match self {
			ExecutionTarget::Host => base_command.to_string(),
			ExecutionTarget::Container(name) => runtime.wrap_command(name, base_command),
		}
	}
}

impl fmt::Display for ExecutionTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExecutionTarget::Host => f.write_str("host"),
			ExecutionTarget::Container(name) => write!(f, "container:{name}"),
		}
	}
}
