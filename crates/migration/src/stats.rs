// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Distribution, MigrationRecord, SourceChain};
use alloy::primitives::U256;
use cm_evm::{BlockRange, BridgeCompletion, GatewayError, TransferEvent};
use cm_utils::formatters::u256_decimal;
use cm_utils::ExcludedAddresses;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainTotals {
    pub count: u64,
    #[serde(with = "u256_decimal")]
    pub amount: U256,
}

impl ChainTotals {
    fn add(&mut self, amount: U256) {
        self.count += 1;
        self.amount = self.amount.saturating_add(amount);
    }
}

/// A source whose head was read but some of whose batches failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialSource {
    pub source: SourceChain,
    pub skipped_batches: Vec<BlockRange>,
}

/// Aggregate figures over the merged, filtered migration records.
///
/// With an empty record set every figure is zero. A source listed in
/// `unavailable_sources` contributed nothing; one listed in `partial_sources`
/// is missing its skipped batches. Either way the figures are lower bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStats {
    pub total_count: u64,
    #[serde(with = "u256_decimal")]
    pub total_amount: U256,
    #[serde(with = "u256_decimal")]
    pub average: U256,
    #[serde(with = "u256_decimal")]
    pub max: U256,
    pub distribution: Distribution,
    pub direct: ChainTotals,
    pub bridged: ChainTotals,
    pub excluded_count: u64,
    pub unavailable_sources: Vec<SourceChain>,
    pub partial_sources: Vec<PartialSource>,
    /// Direct records first, then bridged; each in chain order.
    #[serde(skip)]
    pub records: Vec<MigrationRecord>,
}

/// A combined migrated amount split across the two sources in proportion to
/// their record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Apportionment {
    #[serde(with = "u256_decimal")]
    pub combined_total: U256,
    #[serde(with = "u256_decimal")]
    pub direct: U256,
    #[serde(with = "u256_decimal")]
    pub bridged: U256,
}

impl MigrationStats {
    pub fn is_complete(&self) -> bool {
        self.unavailable_sources.is_empty() && self.partial_sources.is_empty()
    }

    pub fn totals(&self, source: SourceChain) -> &ChainTotals {
        match source {
            SourceChain::Direct => &self.direct,
            SourceChain::Bridged => &self.bridged,
        }
    }

    /// `combined_total * count_x / total_count` for each source, both zero
    /// when there are no records.
    pub fn apportion(&self, combined_total: U256) -> Apportionment {
        Apportionment {
            combined_total,
            direct: share(combined_total, self.direct.count, self.total_count),
            bridged: share(combined_total, self.bridged.count, self.total_count),
        }
    }
}

fn share(combined_total: U256, count: u64, total_count: u64) -> U256 {
    if total_count == 0 {
        return U256::ZERO;
    }
    let count = U256::from(count);
    let total = U256::from(total_count);
    // Multiplying first keeps integer division exact for realistic totals.
    match combined_total.checked_mul(count) {
        Some(product) => product / total,
        None => combined_total / total * count,
    }
}

/// Merge both migration sources into one set of statistics.
///
/// A source passed as `Err` counts as empty and is listed in
/// `unavailable_sources`. Records whose recipient is in `excluded` are
/// dropped before anything is counted.
pub fn aggregate_migrations(
    direct: Result<Vec<TransferEvent>, GatewayError>,
    bridged: Result<Vec<BridgeCompletion>, GatewayError>,
    excluded: &ExcludedAddresses,
) -> MigrationStats {
    let mut unavailable_sources = vec![];

    let mut direct_records: Vec<MigrationRecord> = match direct {
        Ok(transfers) => transfers.iter().map(MigrationRecord::from_direct).collect(),
        Err(e) => {
            warn!(source = %SourceChain::Direct, error = %e, "Migration source unavailable");
            unavailable_sources.push(SourceChain::Direct);
            vec![]
        }
    };
    let mut bridged_records: Vec<MigrationRecord> = match bridged {
        Ok(completions) => completions.iter().map(MigrationRecord::from_bridged).collect(),
        Err(e) => {
            warn!(source = %SourceChain::Bridged, error = %e, "Migration source unavailable");
            unavailable_sources.push(SourceChain::Bridged);
            vec![]
        }
    };

    direct_records.sort_by_key(MigrationRecord::position);
    bridged_records.sort_by_key(MigrationRecord::position);

    let raw_count = direct_records.len() + bridged_records.len();
    let records: Vec<MigrationRecord> = direct_records
        .into_iter()
        .chain(bridged_records)
        .filter(|record| !excluded.contains(&record.recipient))
        .collect();

    let mut stats = MigrationStats {
        excluded_count: (raw_count - records.len()) as u64,
        unavailable_sources,
        ..Default::default()
    };

    for record in &records {
        stats.total_count += 1;
        stats.total_amount = stats.total_amount.saturating_add(record.amount);
        stats.max = stats.max.max(record.amount);
        stats.distribution.add(record.amount);
        match record.source_chain {
            SourceChain::Direct => stats.direct.add(record.amount),
            SourceChain::Bridged => stats.bridged.add(record.amount),
        }
    }

    if stats.total_count > 0 {
        stats.average = stats.total_amount / U256::from(stats.total_count);
    }
    stats.records = records;

    info!(
        total_count = stats.total_count,
        total_amount = %stats.total_amount,
        direct = stats.direct.count,
        bridged = stats.bridged.count,
        excluded = stats.excluded_count,
        "Aggregated migrations"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bucket;
    use alloy::primitives::{address, Address};

    const X: Address = address!("00000000000000000000000000000000000000aa");
    const Y: Address = address!("00000000000000000000000000000000000000bb");
    const TREASURY: Address = address!("00000000000000000000000000000000000000ee");
    const MIGRATOR: Address = address!("00000000000000000000000000000000000000ff");

    fn direct(from: Address, amount: u64, block: u64) -> TransferEvent {
        TransferEvent {
            from,
            to: MIGRATOR,
            amount: U256::from(amount),
            block_number: block,
            log_index: 0,
        }
    }

    fn bridged(recipient: Address, amount: u64, block: u64) -> BridgeCompletion {
        BridgeCompletion {
            recipient,
            amount: U256::from(amount),
            block_number: block,
            log_index: 0,
        }
    }

    fn excluded() -> ExcludedAddresses {
        ExcludedAddresses::new([TREASURY, MIGRATOR])
    }

    #[test]
    fn test_one_record_per_source() {
        let stats = aggregate_migrations(
            Ok(vec![direct(X, 5_000, 10)]),
            Ok(vec![bridged(X, 60_000, 20)]),
            &excluded(),
        );

        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_amount, U256::from(65_000));
        assert_eq!(stats.average, U256::from(32_500));
        assert_eq!(stats.max, U256::from(60_000));
        assert_eq!(stats.distribution.count(Bucket::Under10k), 1);
        assert_eq!(stats.distribution.count(Bucket::From10kTo50k), 0);
        assert_eq!(stats.distribution.count(Bucket::From50kTo100k), 1);
        assert_eq!(stats.distribution.count(Bucket::From100kTo500k), 0);
        assert_eq!(stats.distribution.count(Bucket::Over500k), 0);

        let split = stats.apportion(U256::from(100_000));
        assert_eq!(split.direct, U256::from(50_000));
        assert_eq!(split.bridged, U256::from(50_000));
        assert!(stats.is_complete());
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let stats = aggregate_migrations(Ok(vec![]), Ok(vec![]), &excluded());

        assert_eq!(stats, MigrationStats::default());
        assert_eq!(stats.average, U256::ZERO);
        assert_eq!(stats.max, U256::ZERO);
        assert_eq!(
            stats.apportion(U256::from(1_000)),
            Apportionment {
                combined_total: U256::from(1_000),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_excluded_recipients_dropped() {
        let stats = aggregate_migrations(
            Ok(vec![direct(TREASURY, 1_000_000, 1), direct(X, 20_000, 2)]),
            Ok(vec![
                bridged(Address::ZERO, 700, 3),
                bridged(MIGRATOR, 5, 4),
                bridged(Y, 300, 5),
            ]),
            &excluded(),
        );

        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.excluded_count, 3);
        assert_eq!(stats.max, U256::from(20_000));
        assert_eq!(stats.distribution.count(Bucket::Over500k), 0);
        assert!(stats
            .records
            .iter()
            .all(|r| r.recipient == X || r.recipient == Y));
    }

    #[test]
    fn test_direct_records_precede_bridged() {
        let stats = aggregate_migrations(
            Ok(vec![direct(X, 1, 50), direct(Y, 2, 10)]),
            Ok(vec![bridged(Y, 3, 5), bridged(X, 4, 1)]),
            &excluded(),
        );

        let order: Vec<(SourceChain, u64)> = stats
            .records
            .iter()
            .map(|r| (r.source_chain, r.block_number))
            .collect();
        assert_eq!(
            order,
            vec![
                (SourceChain::Direct, 10),
                (SourceChain::Direct, 50),
                (SourceChain::Bridged, 1),
                (SourceChain::Bridged, 5),
            ]
        );
    }

    #[test]
    fn test_unavailable_source_treated_as_empty() {
        let stats = aggregate_migrations(
            Err(GatewayError::Unavailable("connection refused".into())),
            Ok(vec![bridged(X, 60_000, 1)]),
            &excluded(),
        );

        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.unavailable_sources, vec![SourceChain::Direct]);
        assert!(!stats.is_complete());

        let split = stats.apportion(U256::from(100_000));
        assert_eq!(split.direct, U256::ZERO);
        assert_eq!(split.bridged, U256::from(100_000));
    }

    #[test]
    fn test_partial_source_is_incomplete() {
        let mut stats = aggregate_migrations(
            Ok(vec![direct(X, 5_000, 1)]),
            Ok(vec![bridged(Y, 20_000, 10)]),
            &excluded(),
        );
        assert!(stats.is_complete());

        stats.partial_sources.push(PartialSource {
            source: SourceChain::Bridged,
            skipped_batches: vec![BlockRange::new(150, 199).unwrap()],
        });
        assert!(stats.unavailable_sources.is_empty());
        assert!(!stats.is_complete());
    }

    #[test]
    fn test_both_unavailable() {
        let stats = aggregate_migrations(
            Err(GatewayError::Timeout(std::time::Duration::from_secs(30))),
            Err(GatewayError::Query("range too large".into())),
            &excluded(),
        );

        assert_eq!(stats.total_count, 0);
        assert_eq!(
            stats.unavailable_sources,
            vec![SourceChain::Direct, SourceChain::Bridged]
        );
    }

    #[test]
    fn test_apportion_multiplies_first() {
        let stats = aggregate_migrations(
            Ok(vec![direct(X, 1, 1)]),
            Ok(vec![bridged(X, 1, 1), bridged(Y, 1, 2)]),
            &excluded(),
        );

        let split = stats.apportion(U256::from(10));
        // 10 * 1 / 3 and 10 * 2 / 3, truncated
        assert_eq!(split.direct, U256::from(3));
        assert_eq!(split.bridged, U256::from(6));
    }

    #[test]
    fn test_apportion_huge_total_does_not_overflow() {
        let stats = aggregate_migrations(
            Ok(vec![direct(X, 1, 1)]),
            Ok(vec![bridged(X, 1, 1), bridged(Y, 1, 2)]),
            &excluded(),
        );

        let split = stats.apportion(U256::MAX);
        assert_eq!(split.direct, U256::MAX / U256::from(3));
        assert_eq!(split.bridged, U256::MAX / U256::from(3) * U256::from(2));
    }

    #[test]
    fn test_serialized_amounts_are_decimal() {
        let stats = aggregate_migrations(
            Ok(vec![direct(X, 5_000, 10)]),
            Ok(vec![bridged(X, 60_000, 20)]),
            &excluded(),
        );
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["total_amount"], "65000");
        assert_eq!(json["average"], "32500");
        assert_eq!(json["distribution"]["50k-100k"], 1);
        assert_eq!(json["direct"]["count"], 1);
        assert!(json.get("records").is_none());
    }
}
