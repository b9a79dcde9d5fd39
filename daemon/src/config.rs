use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use cronscope_core::{CronConfig, EmptyTablePolicy};

/// Cronscope daemon - crontab inventory for the host and its containers
#[derive(Parser, Debug)]
#[command(name = "cronscope-daemon")]
pub struct Args {
    /// Bind address
    #[arg(long, env = "CRONSCOPE_LISTEN", default_value = "127.0.0.1:9000")]
    pub listen: String,

    /// Shell used to run every command
    #[arg(long, env = "CRONSCOPE_SHELL", default_value = "/bin/sh")]
    pub shell: PathBuf,

    /// Cron table tool (inserted into commands verbatim)
    #[arg(long, env = "CRONSCOPE_CRONTAB_BIN", default_value = "crontab")]
    pub crontab_bin: String,

    /// Container runtime CLI (inserted into commands verbatim)
    #[arg(long, env = "CRONSCOPE_DOCKER_BIN", default_value = "docker")]
    pub docker_bin: String,

    /// Per-command timeout in seconds
    #[arg(long, env = "CRONSCOPE_COMMAND_TIMEOUT_SECS", default_value_t = 30)]
    pub command_timeout_secs: u64,

    /// Treat an empty job table as a failure (legacy aggregation policy)
    #[arg(long, env = "CRONSCOPE_REJECT_EMPTY_TABLES")]
    pub reject_empty_tables: bool,
}

impl Args {
    pub fn cron_config(&self) -> CronConfig {
        CronConfig {
            shell: self.shell.clone(),
            crontab_bin: self.crontab_bin.clone(),
            docker_bin: self.docker_bin.clone(),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            empty_tables: if self.reject_empty_tables {
                EmptyTablePolicy::Reject
            } else {
                EmptyTablePolicy::Accept
            },
        }
    }
}
