//! Shared test helpers for `lattice-core` unit tests.
//!
//! Provides deterministic identifiers and a fake [`LedgerPrimitives`]
//! implementation so that wallet, work and sync tests share one source of
//! truth for block hashing and work validation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::CoreError;
use crate::primitives::{BlockFields, BuiltBlock, LedgerPrimitives, Link};
use crate::types::{
    Account, Address, BlockHash, PrivateKey, PublicKey, Raw, Work, WorkThreshold,
};

// ==============================================================================
// Identifier Helpers
// ==============================================================================

/// Create a deterministic `BlockHash` from a single distinguishing byte.
pub fn hash_from_byte(b: u8) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    BlockHash::from_bytes(bytes)
}

pub fn private_key(b: u8) -> PrivateKey {
    PrivateKey::from_bytes([b; 32])
}

pub fn address(name: &str) -> Address {
    Address::new(format!("nano_{name}"))
}

pub fn raw(amount: &str) -> Raw {
    amount.parse().expect("test amount must parse")
}

/// 32 stable pseudo-random bytes derived from `input`.
fn digest(input: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (salt, chunk) in out.chunks_mut(8).enumerate() {
        let mut hasher = DefaultHasher::new();
        salt.hash(&mut hasher);
        input.hash(&mut hasher);
        chunk.copy_from_slice(&hasher.finish().to_be_bytes());
    }
    out
}

/// Canonical hash of a fake block: every field except `work` and
/// `signature`, in `serde_json`'s sorted key order.
pub fn fake_block_hash(block: &serde_json::Value) -> BlockHash {
    let mut hashed = block.clone();
    if let Some(fields) = hashed.as_object_mut() {
        fields.remove("work");
        fields.remove("signature");
    }
    let canonical = serde_json::to_string(&hashed).expect("json value serializes");
    BlockHash::from_bytes(digest(canonical.as_bytes()))
}

// ==============================================================================
// Fake Primitives
// ==============================================================================

/// Deterministic stand-in for the real cryptography.
///
/// Work tokens are read as a hex `u64` and compared directly against the
/// threshold, so `format!("{:016x}", threshold)` is always a valid solution.
#[derive(Default)]
pub struct FakePrimitives;

impl LedgerPrimitives for FakePrimitives {
    fn derive_account(&self, key: &PrivateKey) -> Result<Account, CoreError> {
        let public_key = PublicKey::from_bytes(digest(key.as_bytes()));
        Ok(Account {
            address: Address::new(format!("nano_{}", hex::encode(public_key.as_bytes()))),
            public_key,
        })
    }

    fn build_block(&self, key: &PrivateKey, fields: &BlockFields) -> Result<BuiltBlock, CoreError> {
        let link = match &fields.link {
            Link::Receivable(hash) => hash.to_string(),
            Link::Destination(address) => address.to_string(),
            Link::Empty => "0".repeat(64),
        };
        let block = serde_json::json!({
            "type": "state",
            "account": fields.account,
            "previous": fields.previous,
            "representative": fields.representative,
            "balance": fields.balance,
            "link": link,
            "work": "",
        });
        let hash = fake_block_hash(&block);

        let mut signed = block;
        let mut signature = key.as_bytes().to_vec();
        signature.extend_from_slice(hash.as_bytes());
        signed["signature"] = serde_json::json!(hex::encode_upper(digest(&signature)));
        Ok(BuiltBlock {
            hash,
            block: signed,
        })
    }

    fn validate_work(&self, _hash: &BlockHash, threshold: WorkThreshold, work: &Work) -> bool {
        u64::from_str_radix(work.as_str(), 16)
            .map(|difficulty| difficulty >= threshold.0)
            .unwrap_or(false)
    }

    fn is_valid_address(&self, address: &Address) -> bool {
        address.as_str().starts_with("nano_") && address.as_str().len() > 5
    }
}
