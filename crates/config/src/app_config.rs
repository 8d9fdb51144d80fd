// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::{ChainConfig, TokenConfig};
use crate::load_config::find_in_parent;
use crate::load_config::resolve_config_path;
use crate::migration_config::MigrationConfig;
use crate::validation::validate;
use crate::yaml::load_yaml_with_env;
use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use cm_evm::BatchOptions;
use cm_ledger::ReconstructOptions;
use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::time::Duration;
use std::{env, path::PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "chainmetrics.config.yaml";

/// The config actually used throughout the app
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Upper bound for a single RPC request in milliseconds
    request_timeout_ms: u64,
    /// Blocks per `eth_getLogs` request
    batch_size: u64,
    /// Extra attempts for a failing log batch
    max_retries: u32,
    /// Set the Open Telemetry collector grpc endpoint. Eg. 127.0.0.1:4317
    otel: Option<String>,
    /// The chains config
    chains: Vec<ChainConfig>,
    migration: Option<MigrationConfig>,
    /// The config file as found before initialization this is for testing purposes and you should
    /// not use this in your configurations
    found_config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            batch_size: 5_000,
            max_retries: 0,
            otel: None,
            chains: vec![],
            migration: None,
            found_config_file: None,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn batch_options(&self) -> Result<BatchOptions> {
        Ok(BatchOptions {
            batch_size: NonZeroU64::new(self.batch_size)
                .ok_or_else(|| anyhow!("batch_size must be greater than zero"))?,
            max_retries: self.max_retries,
        })
    }

    /// Reconstruction options for `token`, combining its own window with the
    /// global batching settings.
    pub fn reconstruct_options(&self, token: &TokenConfig) -> Result<ReconstructOptions> {
        let batch = self.batch_options()?;
        Ok(ReconstructOptions {
            min_start_block: token.deploy_block.unwrap_or_default(),
            max_window_blocks: NonZeroU64::new(token.max_window_blocks).ok_or_else(|| {
                anyhow!(
                    "max_window_blocks of token {} must be greater than zero",
                    token.name
                )
            })?,
            batch_size: batch.batch_size,
            strategy: token.strategy,
            max_retries: batch.max_retries,
        })
    }

    /// Get the chains config
    pub fn chains(&self) -> &Vec<ChainConfig> {
        &self.chains
    }

    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.name == name)
    }

    pub fn migration(&self) -> Option<&MigrationConfig> {
        self.migration.as_ref()
    }

    /// Get the open telemetry collector url
    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }

    /// Get the config file path
    pub fn config_file(&self) -> Option<&PathBuf> {
        self.found_config_file.as_ref()
    }
}

/// Value struct for passing configuration from the cli to the configuration
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct CliOverrides {
    pub otel: Option<String>,
    pub found_config_file: Option<PathBuf>,
}

/// Load the config at the config_file or the default location if not provided
pub fn load_config(config_file: Option<String>, otel: Option<String>) -> Result<AppConfig> {
    let config_file = config_file.map(PathBuf::from);

    let resolved_config_path = resolve_config_path(
        find_in_parent,       // finding strategy
        env::current_dir()?,  // cwd
        OsDirs::config_dir()?, // default config folder
        DEFAULT_CONFIG_NAME,
        config_file,
    );

    let loaded_yaml =
        load_yaml_with_env(&resolved_config_path).context("Configuration file not found")?;

    let config: AppConfig = Figment::from(Serialized::defaults(&AppConfig::default()))
        .merge(Yaml::string(&loaded_yaml))
        .merge(Serialized::defaults(&CliOverrides {
            otel,
            found_config_file: Some(resolved_config_path),
        }))
        .extract()
        .context("Could not parse configuration")?;

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("chainmetrics needs an OS that can provide a config dir. See https://docs.rs/dirs for more information.")?
            .join("chainmetrics"))
    }
}
