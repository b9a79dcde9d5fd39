// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use tracing::debug;

use crate::aggregator::{AggregateReport, Aggregator};
use crate::config::CronConfig;
use crate::error::{CronError, Result};
use crate::inventory::{CronInventory, CronReport};
use crate::mutator::{CronMutator, MutationOutcome};
use crate::runner::{CommandRunner, ShellRunner};
use crate::runtime::{ContainerRuntime, DockerRuntime};
use crate::target::ExecutionTarget;

/// Entry point for listing and editing job tables.
///
/// Holds no state between calls; every operation builds and runs its
/// commands afresh.
#[derive(Clone)]
pub struct CronService {
	aggregator: Aggregator,
	mutator: CronMutator,
}

impl CronService {
	/// Builds a service that shells out through the configured shell and
	/// discovers containers with the docker CLI.
	pub fn new(config: &CronConfig) -> Self {
		let runner: Arc<dyn CommandRunner> =
			Arc::new(ShellRunner::new(config.shell.clone(), config.command_timeout));
		let runtime: Arc<dyn ContainerRuntime> =
			Arc::new(DockerRuntime::new(config.docker_bin.clone(), runner.clone()));
		Self::with_parts(config, runner, runtime)
	}

	pub fn with_parts(
		config: &CronConfig,
		runner: Arc<dyn CommandRunner>,
		runtime: Arc<dyn ContainerRuntime>,
	) -> Self {
		let inventory = CronInventory::new(runner.clone(), runtime.clone(), config.crontab_bin.clone());
		Self {
			aggregator: Aggregator::new(inventory, runtime, config.empty_tables),
			mutator: CronMutator::new(runner, config.crontab_bin.clone()),
		}
	}

	pub async fn list_all(&self) -> AggregateReport {
		self.aggregator.collect_all().await
	}

	/// Lists one target, failing when its report is not acceptable under
	/// the configured empty-table policy.
	pub async fn list_one(&self, target: &ExecutionTarget) -> Result<CronReport> {
		let report = self.aggregator.collect_one(target).await;
		match self.aggregator.policy().rejection(&report) {
			None => Ok(report),
			Some(reason) => {
				debug!(target = %target, reason = %reason, "rejecting single-target report");
				Err(CronError::Untrusted {
					target: target.clone(),
					reason,
				})
			}
		}
	}

	pub async fn apply<S: AsRef<str>>(
		&self,
		targets: &[ExecutionTarget],
		jobs: &[S],
	) -> Result<Vec<MutationOutcome>> {
		self.mutator.set_crons(targets, jobs).await
	}

	pub async fn remove<S: AsRef<str>>(
		&self,
		targets: &[ExecutionTarget],
		patterns: &[S],
	) -> Result<Vec<MutationOutcome>> {
		self.mutator.delete_crons(targets, patterns).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::aggregator::EmptyTablePolicy;
	use crate::test_support::{ScriptedRunner, StaticRuntime};

	fn service(runner: Arc<ScriptedRunner>, policy: EmptyTablePolicy) -> CronService {
		let config = CronConfig {
			empty_tables: policy,
			..CronConfig::default()
		};
		CronService::with_parts(&config, runner, Arc::new(StaticRuntime(Some(vec![]))))
	}

	#[tokio::test]
	async fn list_one_returns_trusted_report() {
		let runner = Arc::new(ScriptedRunner::default());
		runner.push_stdout("@daily /bin/true\n");

		let report = service(runner, EmptyTablePolicy::Accept)
			.list_one(&ExecutionTarget::Host)
			.await
			.expect("trusted report");
		assert_eq!(report.count, 1);
	}

	#[tokio::test]
	async fn list_one_fails_untrusted_report() {
		let runner = Arc::new(ScriptedRunner::default());
		runner.push_stderr("Error: No such container: gone\n");

		let err = service(runner, EmptyTablePolicy::Accept)
			.list_one(&ExecutionTarget::container("gone"))
			.await
			.expect_err("untrusted");
		match err {
			CronError::Untrusted { target, reason } => {
				assert_eq!(target, ExecutionTarget::container("gone"));
				assert!(reason.contains("No such container"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn list_one_follows_empty_table_policy() {
		let runner = Arc::new(ScriptedRunner::default());
		runner.push_stdout("");
		assert!(service(runner, EmptyTablePolicy::Accept)
			.list_one(&ExecutionTarget::Host)
			.await
			.is_ok());

		let runner = Arc::new(ScriptedRunner::default());
		runner.push_stdout("");
		assert!(service(runner, EmptyTablePolicy::Reject)
			.list_one(&ExecutionTarget::Host)
			.await
			.is_err());
	}

	#[tokio::test]
	async fn remove_rejects_empty_patterns() {
		let runner = Arc::new(ScriptedRunner::default());
		let patterns: Vec<String> = vec![];

		let err = service(runner.clone(), EmptyTablePolicy::Accept)
			.remove(&[ExecutionTarget::Host], patterns.as_slice())
			.await
			.expect_err("empty patterns");
		assert!(err.is_validation());
		assert!(runner.commands().is_empty());
	}
}
