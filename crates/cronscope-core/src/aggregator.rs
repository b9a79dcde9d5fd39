// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Combining per-target inventories into one report.

use std::iter;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::inventory::{CronInventory, CronReport};
use crate::runtime::ContainerRuntime;
use crate::target::ExecutionTarget;

/// Whether a trusted report of an empty table is acceptable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyTablePolicy {
	/// Only untrusted reports are failures.
	#[default]
	Accept,
	/// Any report with no jobs is a failure, trusted or not.
	Reject,
}

impl EmptyTablePolicy {
	/// Returns why `report` is unacceptable, or `None` if it is acceptable.
	pub fn rejection(&self, report: &CronReport) -> Option<String> {
		if !report.trusted {
			return Some(
				report
					.error
					.clone()
					.unwrap_or_else(|| "listing could not be trusted".to_string()),
			);
		}
		match self {
			EmptyTablePolicy::Reject if report.count < 1 => Some("job table is empty".to_string()),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
	Ok,
	Failed,
}

/// Inventory of every live target. A failed aggregate never carries reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
	pub status: AggregateStatus,
	pub reports: Vec<CronReport>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub failure: Option<String>,
}

impl AggregateReport {
	fn failed(failure: String) -> Self {
		Self {
			status: AggregateStatus::Failed,
			reports: Vec::new(),
			failure: Some(failure),
		}
	}

	pub fn is_ok(&self) -> bool {
		self.status == AggregateStatus::Ok
	}
}

/// Visits every discovered container and the host, one at a time.
#[derive(Clone)]
pub struct Aggregator {
	inventory: CronInventory,
	runtime: Arc<dyn ContainerRuntime>,
	policy: EmptyTablePolicy,
}

impl Aggregator {
	pub fn new(
		inventory: CronInventory,
		runtime: Arc<dyn ContainerRuntime>,
		policy: EmptyTablePolicy,
	) -> Self {
		Self {
			inventory,
			runtime,
			policy,
		}
	}

	pub fn policy(&self) -> EmptyTablePolicy {
		self.policy
	}

	/// Lists every live container followed by the host.
	///
	/// The first unacceptable report aborts the pass and discards every
	/// report gathered so far.
	pub async fn collect_all(&self) -> AggregateReport {
		let containers = match self.runtime.list_live_containers().await {
			Ok(names) => names,
			Err(e) => {
				warn!(error = %e, "cron aggregation aborted");
				return AggregateReport::failed(e.to_string());
			}
		};

		let targets = containers
			.into_iter()
			.map(ExecutionTarget::Container)
			.chain(iter::once(ExecutionTarget::Host));

		let mut reports = Vec::new();
		for target in targets {
			let report = self.inventory.list_crons(&target).await;
			if let Some(reason) = self.policy.rejection(&report) {
				warn!(target = %target, reason = %reason, "cron aggregation aborted");
				return AggregateReport::failed(format!("{target}: {reason}"));
			}
			reports.push(report);
		}

		info!(targets = reports.len(), "cron aggregation complete");
		AggregateReport {
			status: AggregateStatus::Ok,
			reports,
			failure: None,
		}
	}

	/// Lists a single target. Failures stay inside the returned report.
	pub async fn collect_one(&self, target: &ExecutionTarget) -> CronReport {
		self.inventory.list_crons(target).await
	}
}
