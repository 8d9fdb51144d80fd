// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod telemetry;

/// Pretty JSON on stdout. Logs go to stderr so the output can be piped.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Could not serialize output")?;
    println!("{json}");
    Ok(())
}
