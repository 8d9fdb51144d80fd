// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{holders, migrations, snapshot};
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cm_config::validation::ValidUrl;
use cm_config::{load_config, AppConfig};
use tracing::{info, instrument, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "chainmetrics")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"))]
#[command(about = "Token holder and migration metrics reconstructed from EVM event logs", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `chainmetrics -vvv` will
    /// give you trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;

        let provider = setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        let result = match self.command {
            Commands::Snapshot => snapshot::execute(&config).await,
            Commands::Holders { chain, token, top } => {
                holders::execute(&config, &chain, &token, top).await
            }
            Commands::Migrations => migrations::execute(&config).await,
        };

        if let Some(provider) = provider {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "Failed to flush telemetry");
            }
        }

        result
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        load_config(self.config.clone(), self.otel.clone().map(Into::into))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct every configured token and aggregate migrations into one JSON snapshot
    Snapshot,

    /// Reconstruct the holders of a single token
    Holders {
        /// Chain name as configured
        #[arg(long)]
        chain: String,

        /// Token name as configured
        #[arg(long)]
        token: String,

        /// Also list the largest holders
        #[arg(long, default_value_t = 0)]
        top: usize,
    },

    /// Aggregate migrations across both chains
    Migrations,
}
