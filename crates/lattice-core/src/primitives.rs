//! Seam to the ledger's cryptographic primitives.
//!
//! Key derivation, block hashing/signing and work verification are pure,
//! deterministic functions supplied by the caller through
//! [`LedgerPrimitives`]. The wallet never inspects block bytes itself; it
//! only compares the canonical hash the primitive returns with the one the
//! node reports.

use crate::error::CoreError;
use crate::types::{Account, Address, BlockHash, PrivateKey, Raw, Work, WorkThreshold};

/// What a block's `link` field points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Receiving: the send block being acknowledged.
    Receivable(BlockHash),
    /// Sending: the destination account.
    Destination(Address),
    /// Representative change only.
    Empty,
}

/// Inputs for a new state block. Work is attached after signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFields {
    pub account: Address,
    pub previous: BlockHash,
    pub representative: Address,
    pub balance: Raw,
    pub link: Link,
}

/// A signed candidate block and its canonical hash.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltBlock {
    pub hash: BlockHash,
    pub block: serde_json::Value,
}

impl BuiltBlock {
    /// The block JSON with `work` filled in, ready for `process`.
    pub fn with_work(&self, work: &Work) -> serde_json::Value {
        let mut block = self.block.clone();
        if let Some(fields) = block.as_object_mut() {
            fields.insert("work".to_owned(), serde_json::json!(work.as_str()));
        }
        block
    }
}

pub trait LedgerPrimitives: Send + Sync {
    /// Derive the account address and public key from a private key.
    fn derive_account(&self, key: &PrivateKey) -> Result<Account, CoreError>;

    /// Build and sign a block, returning its JSON form and canonical hash.
    fn build_block(&self, key: &PrivateKey, fields: &BlockFields) -> Result<BuiltBlock, CoreError>;

    /// Whether `work` reaches `threshold` for `hash`.
    fn validate_work(&self, hash: &BlockHash, threshold: WorkThreshold, work: &Work) -> bool;

    fn is_valid_address(&self, address: &Address) -> bool;
}
