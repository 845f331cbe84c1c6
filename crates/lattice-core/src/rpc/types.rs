//! RPC-specific types that do not belong to the account snapshot.

use serde::{Deserialize, Serialize};

use crate::types::{Address, BlockHash, Raw, Work, WorkThreshold};

// ==============================================================================
// Account Info
// ==============================================================================

/// Remote view of an account from `account_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub frontier: Option<BlockHash>,
    pub balance: Raw,
    pub representative: Option<Address>,
}

impl AccountInfo {
    /// The view of an account that has never had a block committed.
    pub fn unopened() -> Self {
        Self::default()
    }
}

// ==============================================================================
// Work
// ==============================================================================

/// Result of `work_generate`. Servers may omit `work` on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkGenerated {
    pub work: Option<Work>,
    pub difficulty: Option<WorkThreshold>,
}

// ==============================================================================
// Block Subtype
// ==============================================================================

/// Subtype hint sent with `process` so the node can check the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSubtype {
    Open,
    Receive,
    Send,
    Change,
}

impl std::fmt::Display for BlockSubtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Receive => write!(f, "receive"),
            Self::Send => write!(f, "send"),
            Self::Change => write!(f, "change"),
        }
    }
}
