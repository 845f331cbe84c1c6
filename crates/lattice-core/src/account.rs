//! The account snapshot mirrored from the ledger.

use serde::{Deserialize, Serialize};

use crate::state::Snapshot;
use crate::types::{Address, BlockHash, Raw, Work, WorkThreshold};

/// Funds sent to this account that have not been received on its chain yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivableBlock {
    pub hash: BlockHash,
    pub amount: Raw,
}

/// A work solution kept for reuse. Only valid for `hash`; `threshold` is
/// the difficulty the solution is known to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedWork {
    pub hash: BlockHash,
    pub threshold: WorkThreshold,
    pub work: Work,
}

impl CachedWork {
    pub fn satisfies(&self, hash: &BlockHash, threshold: WorkThreshold) -> bool {
        self.hash == *hash && self.threshold >= threshold
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Raw,
    pub receivable_total: Raw,
    pub receivable: Vec<ReceivableBlock>,
    /// `None` until the account's first block is committed.
    pub frontier: Option<BlockHash>,
    pub representative: Option<Address>,
    pub work: Option<CachedWork>,
}

impl AccountState {
    pub fn find_receivable(&self, hash: &BlockHash) -> Option<&ReceivableBlock> {
        self.receivable.iter().find(|block| block.hash == *hash)
    }

    pub fn is_opened(&self) -> bool {
        self.frontier.is_some()
    }
}

/// Partial update for [`AccountState`]. Unset fields are preserved.
#[derive(Debug, Clone, Default)]
pub struct AccountStatePatch {
    pub balance: Option<Raw>,
    // Set together through `receivable()` only.
    receivable_total: Option<Raw>,
    receivable: Option<Vec<ReceivableBlock>>,
    pub frontier: Option<Option<BlockHash>>,
    pub representative: Option<Option<Address>>,
    pub work: Option<Option<CachedWork>>,
}

impl AccountStatePatch {
    pub fn balance(mut self, balance: Raw) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Set the receivable list together with its recomputed total.
    pub fn receivable(mut self, blocks: Vec<ReceivableBlock>) -> Self {
        self.receivable_total = Some(Raw::sum(blocks.iter().map(|block| &block.amount)));
        self.receivable = Some(blocks);
        self
    }

    pub fn frontier(mut self, frontier: Option<BlockHash>) -> Self {
        self.frontier = Some(frontier);
        self
    }

    pub fn representative(mut self, representative: Option<Address>) -> Self {
        self.representative = Some(representative);
        self
    }

    pub fn work(mut self, work: Option<CachedWork>) -> Self {
        self.work = Some(work);
        self
    }
}

impl Snapshot for AccountState {
    type Patch = AccountStatePatch;

    fn apply(&mut self, patch: AccountStatePatch) {
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
        if let Some(total) = patch.receivable_total {
            self.receivable_total = total;
        }
        if let Some(receivable) = patch.receivable {
            self.receivable = receivable;
        }
        if let Some(frontier) = patch.frontier {
            self.frontier = frontier;
        }
        if let Some(representative) = patch.representative {
            self.representative = representative;
        }
        if let Some(work) = patch.work {
            self.work = work;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::hash_from_byte;

    #[test]
    fn receivable_patch_recomputes_total() {
        let mut state = AccountState::default();
        state.apply(AccountStatePatch::default().receivable(vec![
            ReceivableBlock {
                hash: hash_from_byte(1),
                amount: "300000000000000000000000000000000000000".parse().unwrap(),
            },
            ReceivableBlock {
                hash: hash_from_byte(2),
                amount: "200000000000000000000000000000000000000".parse().unwrap(),
            },
        ]));
        assert_eq!(
            state.receivable_total.to_string(),
            "500000000000000000000000000000000000000"
        );
    }

    #[test]
    fn balance_patch_leaves_receivable_pair_intact() {
        let mut state = AccountState::default();
        state.apply(AccountStatePatch::default().receivable(vec![ReceivableBlock {
            hash: hash_from_byte(1),
            amount: Raw::from(7u128),
        }]));
        state.apply(AccountStatePatch::default().balance(Raw::from(3u128)));
        assert_eq!(state.receivable_total, Raw::from(7u128));

        state.apply(AccountStatePatch::default().receivable(Vec::new()));
        assert!(state.receivable.is_empty());
        assert!(state.receivable_total.is_zero());
    }

    #[test]
    fn patch_can_clear_optional_fields() {
        let mut state = AccountState {
            frontier: Some(hash_from_byte(9)),
            balance: Raw::from(10u128),
            ..Default::default()
        };
        state.apply(AccountStatePatch::default().frontier(None));
        assert_eq!(state.frontier, None);
        assert_eq!(state.balance, Raw::from(10u128));
    }

    #[test]
    fn cached_work_requires_same_hash_and_enough_difficulty() {
        let cached = CachedWork {
            hash: hash_from_byte(1),
            threshold: WorkThreshold(100),
            work: Work::new("00000000000000ff"),
        };
        assert!(cached.satisfies(&hash_from_byte(1), WorkThreshold(100)));
        assert!(cached.satisfies(&hash_from_byte(1), WorkThreshold(50)));
        assert!(!cached.satisfies(&hash_from_byte(1), WorkThreshold(101)));
        assert!(!cached.satisfies(&hash_from_byte(2), WorkThreshold(50)));
    }
}
