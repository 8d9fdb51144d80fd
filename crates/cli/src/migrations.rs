// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::print_json;
use crate::snapshot::{connect_all, migration_target};
use anyhow::{anyhow, Result};
use cm_config::AppConfig;
use tracing::info;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let gateways = connect_all(config).await;
    let target = migration_target(config, &gateways)?
        .ok_or_else(|| anyhow!("No migration section in configuration"))?;

    let report = target.run().await;
    info!(
        total_count = report.stats.total_count,
        complete = report.stats.is_complete(),
        "Migration aggregation finished"
    );
    print_json(&report)
}
