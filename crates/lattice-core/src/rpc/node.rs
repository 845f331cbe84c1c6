use async_trait::async_trait;
use reqwest::Url;

use crate::account::ReceivableBlock;
use crate::error::CoreError;
use crate::types::{Address, BlockHash, Raw, WorkThreshold};

use super::failover::{FailoverClient, Transport};
use super::parsing::{parse_account_info, parse_process, parse_receivable, parse_work_generate};
use super::protocol::NodeRequest;
use super::types::{AccountInfo, BlockSubtype, WorkGenerated};
use super::NanoRpc;

/// [`NanoRpc`] over two independent failover lists: ledger actions go to
/// the RPC list, `work_generate` goes to the work list.
pub struct NodeClient<T> {
    rpc: FailoverClient<T>,
    work: FailoverClient<T>,
}

impl<T: Transport> NodeClient<T> {
    pub fn new(rpc: FailoverClient<T>, work: FailoverClient<T>) -> Self {
        Self { rpc, work }
    }

    pub fn rpc_endpoints(&self) -> &[Url] {
        self.rpc.endpoints()
    }

    pub fn work_endpoints(&self) -> &[Url] {
        self.work.endpoints()
    }
}

#[async_trait]
impl<T: Transport> NanoRpc for NodeClient<T> {
    async fn account_info(&self, account: &Address) -> Result<AccountInfo, CoreError> {
        let request = NodeRequest::AccountInfo {
            account,
            representative: "true",
        };
        self.rpc.send(&request, parse_account_info).await
    }

    async fn receivable(
        &self,
        account: &Address,
        count: u32,
        threshold: &Raw,
    ) -> Result<Vec<ReceivableBlock>, CoreError> {
        let request = NodeRequest::Receivable {
            account,
            count: count.to_string(),
            threshold: threshold.to_string(),
        };
        self.rpc.send(&request, parse_receivable).await
    }

    async fn work_generate(
        &self,
        hash: &BlockHash,
        difficulty: WorkThreshold,
    ) -> Result<WorkGenerated, CoreError> {
        let request = NodeRequest::WorkGenerate { hash, difficulty };
        self.work.send(&request, parse_work_generate).await
    }

    async fn process(
        &self,
        subtype: BlockSubtype,
        block: &serde_json::Value,
    ) -> Result<BlockHash, CoreError> {
        let request = NodeRequest::Process {
            json_block: "true",
            subtype,
            block,
        };
        self.rpc.send(&request, parse_process).await
    }
}
