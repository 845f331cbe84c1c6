//! Value types shared across the ledger client.
//!
//! Contains the raw-unit amount (`Raw`), 32-byte identifiers (`BlockHash`,
//! `PublicKey`, `PrivateKey`), account addresses, work tokens and the
//! difficulty threshold they are measured against.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// ==============================================================================
// Raw Amounts
// ==============================================================================

/// A non-negative amount in raw units.
///
/// Raw balances routinely exceed `u128` headroom once summed, so the value
/// is backed by an arbitrary-precision integer and travels as a decimal
/// string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Raw(BigUint);

impl Raw {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    pub fn checked_add(&self, other: &Raw) -> Raw {
        Raw(&self.0 + &other.0)
    }

    /// Subtract `other`, or `None` when the result would be negative.
    pub fn checked_sub(&self, other: &Raw) -> Option<Raw> {
        if self.0 < other.0 {
            return None;
        }
        Some(Raw(&self.0 - &other.0))
    }

    /// Exact sum of an iterator of amounts.
    pub fn sum<'a>(amounts: impl IntoIterator<Item = &'a Raw>) -> Raw {
        amounts
            .into_iter()
            .fold(BigUint::default(), |acc, amount| acc + &amount.0)
            .into()
    }
}

impl From<BigUint> for Raw {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u128> for Raw {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl FromStr for Raw {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidAmount(format!(
                "`{s}` is not a non-negative decimal raw amount"
            )));
        }
        let value = s
            .parse::<BigUint>()
            .map_err(|e| CoreError::InvalidAmount(format!("`{s}`: {e}")))?;
        Ok(Self(value))
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Raw {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Raw {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// Block Hash
// ==============================================================================

/// A 32-byte block hash, rendered as upper-case hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for BlockHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_32(s, "block hash")?))
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({self})")
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn decode_32(s: &str, what: &str) -> Result<[u8; 32], CoreError> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(s, &mut bytes)
        .map_err(|e| CoreError::InvalidData(format!("invalid {what} `{s}`: {e}")))?;
    Ok(bytes)
}

// ==============================================================================
// Keys
// ==============================================================================

/// An account public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The key reinterpreted as a block root. An unopened account has no
    /// frontier, so its first block is rooted on its own public key.
    pub fn as_root(&self) -> BlockHash {
        BlockHash(self.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

/// A raw 32-byte private key. `Debug` never prints the key material.
#[derive(Clone)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PrivateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CoreError::Key(format!("private key must be 64 hex digits: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

// ==============================================================================
// Addresses
// ==============================================================================

/// An encoded account address. Structural validation belongs to
/// [`crate::primitives::LedgerPrimitives::is_valid_address`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidAddress("address must not be empty".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Derived identity of the wallet's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub public_key: PublicKey,
}

// ==============================================================================
// Proof of Work
// ==============================================================================

/// A proof-of-work token as returned by `work_generate` (hex string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Work(String);

impl Work {
    pub fn new(work: impl Into<String>) -> Self {
        Self(work.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimum difficulty a work solution must reach. Larger values are
/// stricter; on the wire it is a 16-digit hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkThreshold(pub u64);

/// Network threshold for send, change and sweep blocks.
pub const SEND_THRESHOLD: WorkThreshold = WorkThreshold(0xfffffff800000000);

/// Network threshold for receive and open blocks.
pub const RECEIVE_THRESHOLD: WorkThreshold = WorkThreshold(0xfffffe0000000000);

impl fmt::Display for WorkThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for WorkThreshold {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| CoreError::InvalidData(format!("invalid difficulty `{s}`: {e}")))
    }
}

impl Serialize for WorkThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WorkThreshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
