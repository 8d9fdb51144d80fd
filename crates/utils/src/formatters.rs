// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Serde adapters writing 256-bit integers as decimal strings.
//!
//! alloy's own serde impls emit `0x`-prefixed hex, which dashboards cannot
//! display or sum without a bignum library.

use alloy_primitives::{I256, U256};
use serde::{de, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub mod u256_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Accepts decimal or `0x` hex strings as well as plain JSON/YAML integers.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(U256::from(v)),
            Raw::Str(s) => U256::from_str(s.trim()).map_err(de::Error::custom),
        }
    }
}

pub mod option_u256_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<U256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }
}

pub mod i256_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &I256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}
