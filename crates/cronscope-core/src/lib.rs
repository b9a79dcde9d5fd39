// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Crontab inventory and mutation across the host and its containers.
//!
//! Job lines are opaque text; nothing here parses schedule expressions.
//! The crate is organised leaves first:
//!
//! - [`runner`]: runs one shell command, separating stdout from stderr
//! - [`target`]: [`ExecutionTarget`] and the command wrapping it implies
//! - [`runtime`]: container discovery and remote-exec construction
//! - [`inventory`]: reading one target's table into a [`CronReport`]
//! - [`mutator`]: appending to and filtering a target's table
//! - [`aggregator`]: combining every live target into an [`AggregateReport`]
//! - [`service`]: the [`CronService`] façade used by the daemon

pub mod aggregator;
pub mod config;
pub mod error;
pub mod inventory;
pub mod mutator;
pub mod runner;
pub mod runtime;
pub mod service;
pub mod shell;
pub mod target;

#[cfg(test)]
mod test_support;

pub use aggregator::{AggregateReport, AggregateStatus, Aggregator, EmptyTablePolicy};
pub use config::CronConfig;
pub use error::{CronError, Result};
pub use inventory::{CronInventory, CronReport};
pub use mutator::{CronMutator, MutationOutcome, MutationStatus, PatternFilter};
pub use runner::{CommandOutput, CommandRunner, Diagnostics, ShellRunner};
pub use runtime::{ContainerRuntime, DockerRuntime};
pub use service::CronService;
pub use target::ExecutionTarget;
