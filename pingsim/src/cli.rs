//! Command-line interface definitions and parsing

use chrono::{DateTime, Utc};
use clap::Parser;
use pingsim::{PacketLoss, ProbeModel, SessionConfig, defaults::DEFAULT_TARGET, export_file_name};
use pingsim_core::time::Duration;
use std::path::PathBuf;

/// Simulated ping: probe a target once per interval and print the replies.
///
/// No packet ever leaves the machine: latency and loss are simulated.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// IP address or hostname to ping
    #[arg(env = "PINGSIM_TARGET", default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Stop after this long (e.g. `30s`, `1m 30s`). Runs until Ctrl-C otherwise
    #[arg(short, long, env = "PINGSIM_DURATION")]
    pub duration: Option<Duration>,

    /// Time between two probes
    #[arg(short, long, env = "PINGSIM_INTERVAL", default_value = "1s")]
    pub interval: Duration,

    /// Share of probes that time out
    #[arg(long, env = "PINGSIM_LOSS", default_value = "2%")]
    pub loss: PacketLoss,

    /// Seed of the simulation, for reproducible runs
    #[arg(long, env = "PINGSIM_SEED")]
    pub seed: Option<u64>,

    /// Export the session log to this file once stopped
    #[arg(long, conflicts_with = "export_dir")]
    pub export: Option<PathBuf>,

    /// Export the session log to `<dir>/ping-log-<epoch millis>.txt` once stopped
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Diagnostic log filter (`error`, `warn`, `info`, `debug`, `trace`)
    #[arg(long, env = "PINGSIM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable verbose (debug) diagnostics, overrides `--log-level`
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        let model = ProbeModel::default().with_loss(self.loss);
        let config = SessionConfig::default()
            .with_interval(self.interval.into_duration())
            .with_model(model);

        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    pub fn log_filter(&self) -> &str {
        if self.verbose { "debug" } else { &self.log_level }
    }

    pub fn export_path(&self, now: DateTime<Utc>) -> Option<PathBuf> {
        self.export.clone().or_else(|| {
            self.export_dir
                .as_ref()
                .map(|dir| dir.join(export_file_name(now)))
        })
    }
}
