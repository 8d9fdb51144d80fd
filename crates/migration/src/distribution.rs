// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::U256;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Size class of a migrated amount, in token base units. Buckets are
/// half-open: a value equal to a boundary falls in the upper bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, IntoStaticStr,
)]
pub enum Bucket {
    #[strum(serialize = "<10k")]
    Under10k = 0,
    #[strum(serialize = "10k-50k")]
    From10kTo50k = 1,
    #[strum(serialize = "50k-100k")]
    From50kTo100k = 2,
    #[strum(serialize = "100k-500k")]
    From100kTo500k = 3,
    #[strum(serialize = ">=500k")]
    Over500k = 4,
}

impl Bucket {
    pub fn of(amount: U256) -> Self {
        if amount < U256::from(10_000u64) {
            Bucket::Under10k
        } else if amount < U256::from(50_000u64) {
            Bucket::From10kTo50k
        } else if amount < U256::from(100_000u64) {
            Bucket::From50kTo100k
        } else if amount < U256::from(500_000u64) {
            Bucket::From100kTo500k
        } else {
            Bucket::Over500k
        }
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// Count of records per [`Bucket`]. Serializes as a label to count map in
/// bucket order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    counts: [u64; Bucket::COUNT],
}

impl Distribution {
    pub fn add(&mut self, amount: U256) {
        self.counts[Bucket::of(amount) as usize] += 1;
    }

    pub fn count(&self, bucket: Bucket) -> u64 {
        self.counts[bucket as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, u64)> + '_ {
        Bucket::iter().map(|bucket| (bucket, self.count(bucket)))
    }
}

impl FromIterator<U256> for Distribution {
    fn from_iter<I: IntoIterator<Item = U256>>(iter: I) -> Self {
        let mut distribution = Distribution::default();
        for amount in iter {
            distribution.add(amount);
        }
        distribution
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Bucket::COUNT))?;
        for (bucket, count) in self.iter() {
            map.serialize_entry(bucket.label(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_half_open() {
        let cases = [
            (0u64, Bucket::Under10k),
            (9_999, Bucket::Under10k),
            (10_000, Bucket::From10kTo50k),
            (49_999, Bucket::From10kTo50k),
            (50_000, Bucket::From50kTo100k),
            (100_000, Bucket::From100kTo500k),
            (499_999, Bucket::From100kTo500k),
            (500_000, Bucket::Over500k),
            (u64::MAX, Bucket::Over500k),
        ];
        for (amount, expected) in cases {
            assert_eq!(Bucket::of(U256::from(amount)), expected, "amount {amount}");
        }
    }

    #[test]
    fn test_counts_sum_to_records() {
        let distribution: Distribution = [5_000u64, 60_000, 60_000, 1_000_000]
            .into_iter()
            .map(U256::from)
            .collect();

        assert_eq!(distribution.total(), 4);
        assert_eq!(distribution.count(Bucket::From50kTo100k), 2);
        assert_eq!(distribution.count(Bucket::From10kTo50k), 0);
    }

    #[test]
    fn test_serializes_in_bucket_order() {
        let distribution: Distribution = [5_000u64, 60_000].into_iter().map(U256::from).collect();
        let json = serde_json::to_string(&distribution).unwrap();
        assert_eq!(
            json,
            r#"{"<10k":1,"10k-50k":0,"50k-100k":1,"100k-500k":0,">=500k":0}"#
        );
    }

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = Bucket::iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["<10k", "10k-50k", "50k-100k", "100k-500k", ">=500k"]);
    }
}
