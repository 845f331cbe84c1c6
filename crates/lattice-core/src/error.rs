use std::time::Duration;

use crate::types::{BlockHash, Raw, WorkThreshold};

/// Failures raised while talking to a remote node.
///
/// Everything except [`RpcError::Node`] describes an unavailable or
/// misbehaving endpoint and is retried against the next endpoint in the
/// failover list. A `Node` error is a well-formed reply from the node
/// rejecting the request itself and is surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("endpoint returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("node error: {0}")]
    Node(String),
}

impl RpcError {
    /// Whether the failure points at the endpoint rather than the request.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Node(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(#[from] RpcError),

    #[error("no {0} endpoints configured")]
    NoEndpoints(&'static str),

    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("missing receivable block {0}")]
    MissingReceivable(BlockHash),

    #[error("no frontier: account has not been opened yet")]
    NoFrontier,

    #[error("insufficient balance: have {balance} raw, need {amount} raw")]
    InsufficientBalance { balance: Raw, amount: Raw },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no representative set and no default representative configured")]
    NoRepresentative,

    #[error("work generation returned no solution for {0}")]
    MissingWork(BlockHash),

    #[error("work {work} does not satisfy threshold {threshold} for {hash}")]
    InvalidWork {
        hash: BlockHash,
        threshold: WorkThreshold,
        work: String,
    },

    #[error("block integrity check failed: built {expected}, node reported {reported}")]
    Integrity {
        expected: BlockHash,
        reported: BlockHash,
    },

    #[error("invalid ledger data: {0}")]
    InvalidData(String),

    #[error("key derivation failed: {0}")]
    Key(String),

    #[error("state persistence failed: {0}")]
    Persist(#[from] std::io::Error),
}

impl CoreError {
    /// The node-reported message, when this error is an application-level
    /// rejection from the remote node.
    pub fn node_message(&self) -> Option<&str> {
        match self {
            Self::Rpc(RpcError::Node(message)) => Some(message),
            _ => None,
        }
    }
}
