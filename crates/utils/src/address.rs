// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a 20 byte hex address: {reason}")]
pub struct AddressError {
    input: String,
    reason: String,
}

/// Parse a hex address regardless of letter case or checksum.
///
/// RPC nodes hand back a mix of lowercase and EIP-55 checksummed strings. Keys
/// built from the parsed 20 bytes compare equal no matter how the string was
/// spelled.
pub fn normalize_address(input: &str) -> Result<Address, AddressError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.len() != 40 {
        return Err(AddressError {
            input: input.to_string(),
            reason: format!("expected 40 hex characters, got {}", hex.len()),
        });
    }

    Address::from_str(&hex.to_ascii_lowercase()).map_err(|e| AddressError {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Addresses whose flows are protocol plumbing rather than holder activity
/// (treasury, migration contracts, deployers). The zero address is always a
/// member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedAddresses(HashSet<Address>);

impl ExcludedAddresses {
    pub fn new<I: IntoIterator<Item = Address>>(addresses: I) -> Self {
        let mut set: HashSet<Address> = addresses.into_iter().collect();
        set.insert(Address::ZERO);
        Self(set)
    }

    pub fn parse<S: AsRef<str>>(addresses: &[S]) -> Result<Self, AddressError> {
        let parsed = addresses
            .iter()
            .map(|a| normalize_address(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parsed))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExcludedAddresses {
    fn default() -> Self {
        Self::new([])
    }
}
