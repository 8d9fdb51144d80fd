// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::HolderStrategy;
use alloy::primitives::{Address, I256, U256};
use cm_evm::TransferEvent;
use cm_utils::{normalize_address, AddressError};
use std::collections::HashMap;

/// Net balance change per address, accumulated from `Transfer` events.
///
/// This is a **windowed approximation** of the token's balance sheet. Only
/// transfers inside the scanned block range are replayed, so:
///
/// - an address that received its tokens before the window and has not moved
///   them since is invisible;
/// - an address that received before the window and sent inside it carries a
///   negative delta and is not counted as a holder.
///
/// When the window reaches back to the deploy block the deltas equal real
/// balances.
///
/// Keys are 20 byte [`Address`] values so differently cased spellings of one
/// address share an entry. The zero address is never a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceLedger {
    strategy: HolderStrategy,
    balances: HashMap<Address, I256>,
}

impl BalanceLedger {
    pub fn new(strategy: HolderStrategy) -> Self {
        Self {
            strategy,
            balances: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> HolderStrategy {
        self.strategy
    }

    /// Apply one transfer. Mints and burns only touch their non-zero side.
    pub fn record(&mut self, event: &TransferEvent) {
        let amount = to_signed(event.amount);

        if !event.is_mint() && self.strategy.debits_senders() {
            let entry = self.balances.entry(event.from).or_insert(I256::ZERO);
            *entry = entry.saturating_sub(amount);
        }

        if !event.is_burn() {
            let entry = self.balances.entry(event.to).or_insert(I256::ZERO);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn balance_of(&self, address: &Address) -> I256 {
        self.balances.get(address).copied().unwrap_or(I256::ZERO)
    }

    /// Like [`Self::balance_of`] for a hex string in any letter case.
    pub fn balance_of_hex(&self, address: &str) -> Result<I256, AddressError> {
        Ok(self.balance_of(&normalize_address(address)?))
    }

    /// Number of addresses with an entry, including zero and negative deltas.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Address, &I256)> {
        self.balances.iter()
    }

    pub fn holders(&self) -> HolderSet<'_> {
        HolderSet { ledger: self }
    }

    pub fn holder_count(&self) -> usize {
        self.holders().len()
    }

    /// The `n` largest positive balances, largest first. Ties are ordered by
    /// address so the output is stable.
    pub fn top_holders(&self, n: usize) -> Vec<(Address, I256)> {
        let mut holders: Vec<(Address, I256)> = self
            .holders()
            .iter()
            .map(|(address, balance)| (*address, *balance))
            .collect();
        holders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        holders.truncate(n);
        holders
    }
}

/// Read-only view of the addresses in a [`BalanceLedger`] with a strictly
/// positive balance.
#[derive(Debug, Clone, Copy)]
pub struct HolderSet<'a> {
    ledger: &'a BalanceLedger,
}

impl<'a> HolderSet<'a> {
    pub fn iter(&self) -> impl Iterator<Item = (&'a Address, &'a I256)> {
        self.ledger
            .balances
            .iter()
            .filter(|(_, balance)| balance.is_positive())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.ledger.balance_of(address).is_positive()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Transfer values above i256::MAX cannot come from a real token.
fn to_signed(amount: U256) -> I256 {
    I256::try_from(amount).unwrap_or(I256::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use proptest::prelude::*;

    const A: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const B: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
    const C: Address = address!("cccccccccccccccccccccccccccccccccccccccc");

    fn transfer(from: Address, to: Address, amount: u64) -> TransferEvent {
        TransferEvent {
            from,
            to,
            amount: U256::from(amount),
            block_number: 1,
            log_index: 0,
        }
    }

    fn signed(value: i64) -> I256 {
        I256::try_from(value).unwrap()
    }

    fn replay(strategy: HolderStrategy, events: &[TransferEvent]) -> BalanceLedger {
        let mut ledger = BalanceLedger::new(strategy);
        for event in events {
            ledger.record(event);
        }
        ledger
    }

    #[test]
    fn test_mint_transfer_burn() {
        let ledger = replay(
            HolderStrategy::BalanceReplay,
            &[
                transfer(Address::ZERO, A, 100),
                transfer(A, B, 40),
                transfer(B, Address::ZERO, 10),
            ],
        );

        assert_eq!(ledger.balance_of(&A), signed(60));
        assert_eq!(ledger.balance_of(&B), signed(30));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.holder_count(), 2);
    }

    #[test]
    fn test_zero_address_never_recorded() {
        let ledger = replay(
            HolderStrategy::BalanceReplay,
            &[
                transfer(Address::ZERO, A, 5),
                transfer(A, Address::ZERO, 5),
                transfer(Address::ZERO, Address::ZERO, 7),
            ],
        );

        assert_eq!(ledger.balance_of(&Address::ZERO), I256::ZERO);
        assert!(ledger.entries().all(|(address, _)| *address != Address::ZERO));
        assert_eq!(ledger.holder_count(), 0);
    }

    #[test]
    fn test_sender_before_window_goes_negative() {
        // C received before the window, only its outgoing transfer is seen.
        let ledger = replay(HolderStrategy::BalanceReplay, &[transfer(C, A, 10)]);

        assert!(ledger.balance_of(&C).is_negative());
        assert!(!ledger.holders().contains(&C));
        assert!(ledger.holders().contains(&A));
        assert_eq!(ledger.holder_count(), 1);
    }

    #[test]
    fn test_mixed_case_spellings_share_entry() {
        let lower = normalize_address("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        let upper = normalize_address("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").unwrap();
        let ledger = replay(
            HolderStrategy::BalanceReplay,
            &[transfer(Address::ZERO, lower, 3), transfer(Address::ZERO, upper, 4)],
        );

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger
                .balance_of_hex("0xAbCdEfabcdefabcdefabcdefabcdefabcdefABCD")
                .unwrap(),
            signed(7)
        );
    }

    #[test]
    fn test_recent_recipients_never_debits() {
        let ledger = replay(
            HolderStrategy::RecentRecipients,
            &[
                transfer(Address::ZERO, A, 100),
                transfer(A, B, 100),
                transfer(B, Address::ZERO, 100),
            ],
        );

        assert_eq!(ledger.balance_of(&A), signed(100));
        assert_eq!(ledger.holder_count(), 2);

        let replayed = replay(
            HolderStrategy::BalanceReplay,
            &[
                transfer(Address::ZERO, A, 100),
                transfer(A, B, 100),
                transfer(B, Address::ZERO, 100),
            ],
        );
        assert_eq!(replayed.holder_count(), 0);
    }

    #[test]
    fn test_top_holders_ordering() {
        let ledger = replay(
            HolderStrategy::BalanceReplay,
            &[
                transfer(Address::ZERO, A, 50),
                transfer(Address::ZERO, B, 80),
                transfer(Address::ZERO, C, 50),
            ],
        );

        let top = ledger.top_holders(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, B);
        assert_eq!(top[1].0, A);
    }

    #[test]
    fn test_oversized_amount_saturates() {
        let mut ledger = BalanceLedger::default();
        ledger.record(&TransferEvent {
            from: Address::ZERO,
            to: A,
            amount: U256::MAX,
            block_number: 1,
            log_index: 0,
        });
        ledger.record(&transfer(Address::ZERO, A, 1));
        assert_eq!(ledger.balance_of(&A), I256::MAX);
    }

    fn arb_party() -> impl Strategy<Value = Address> {
        prop_oneof![Just(Address::ZERO), Just(A), Just(B), Just(C)]
    }

    fn arb_transfer() -> impl Strategy<Value = TransferEvent> {
        (arb_party(), arb_party(), 0u64..1_000).prop_map(|(from, to, amount)| transfer(from, to, amount))
    }

    proptest! {
        #[test]
        fn prop_replay_order_does_not_matter(
            (events, shuffled) in prop::collection::vec(arb_transfer(), 0..40)
                .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
        ) {
            for strategy in [HolderStrategy::BalanceReplay, HolderStrategy::RecentRecipients] {
                let in_order = replay(strategy, &events);
                let reordered = replay(strategy, &shuffled);
                prop_assert_eq!(in_order.holder_count(), reordered.holder_count());
                prop_assert_eq!(&in_order, &reordered);
            }
        }

        #[test]
        fn prop_zero_address_has_no_entry(events in prop::collection::vec(arb_transfer(), 0..40)) {
            let ledger = replay(HolderStrategy::BalanceReplay, &events);
            prop_assert_eq!(ledger.balance_of(&Address::ZERO), I256::ZERO);
        }
    }
}
