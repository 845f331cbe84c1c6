//! Node RPC abstraction layer.
//!
//! Defines the [`NanoRpc`] trait and provides a failover implementation
//! ([`NodeClient`]) over a pluggable [`Transport`], an HTTP transport
//! ([`HttpTransport`]) plus a test mock (`mock::MockRpc`).

mod failover;
mod http_adapter;
#[cfg(test)]
pub mod mock;
mod node;
mod parsing;
mod protocol;
pub mod types;

pub use failover::{FailoverClient, Transport};
pub use http_adapter::{HttpRpcClient, HttpTransport};
pub use node::NodeClient;
pub use types::{AccountInfo, BlockSubtype, WorkGenerated};

use async_trait::async_trait;

use crate::account::ReceivableBlock;
use crate::error::CoreError;
use crate::types::{Address, BlockHash, Raw, WorkThreshold};

/// The node actions the wallet needs.
///
/// Implementations own endpoint selection and response decoding. Errors
/// keep the node's own message in [`crate::error::RpcError::Node`] so that
/// callers can recognize specific rejections.
#[async_trait]
pub trait NanoRpc: Send + Sync {
    /// Frontier, balance and representative of `account`.
    async fn account_info(&self, account: &Address) -> Result<AccountInfo, CoreError>;

    /// Up to `count` receivable blocks for `account` of at least `threshold` raw.
    async fn receivable(
        &self,
        account: &Address,
        count: u32,
        threshold: &Raw,
    ) -> Result<Vec<ReceivableBlock>, CoreError>;

    /// Ask a work server to solve `hash` at `difficulty`.
    async fn work_generate(
        &self,
        hash: &BlockHash,
        difficulty: WorkThreshold,
    ) -> Result<WorkGenerated, CoreError>;

    /// Publish a signed block (with work attached). Returns the hash the node
    /// assigned to it.
    async fn process(
        &self,
        subtype: BlockSubtype,
        block: &serde_json::Value,
    ) -> Result<BlockHash, CoreError>;
}
