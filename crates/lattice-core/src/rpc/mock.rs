use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::account::ReceivableBlock;
use crate::error::{CoreError, RpcError};
use crate::test_util::fake_block_hash;
use crate::types::{Address, BlockHash, Raw, Work, WorkThreshold};

use super::types::{AccountInfo, BlockSubtype, WorkGenerated};
use super::NanoRpc;

/// How the mock answers `work_generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkMode {
    /// A token that exactly meets the requested difficulty.
    Satisfy,
    /// A reply without a `work` field.
    Missing,
    /// A token below any real threshold.
    TooWeak,
}

/// A mock node for testing. Serves canned account data populated via the
/// builder pattern, and keeps a tiny ledger of frontiers so that blocks
/// built on a stale frontier are rejected the way a real node would.
pub struct MockRpc {
    accounts: HashMap<Address, AccountInfo>,
    receivable: HashMap<Address, Vec<ReceivableBlock>>,
    work_mode: WorkMode,
    reported_hash: Option<BlockHash>,
    failing: HashMap<&'static str, String>,
    frontiers: Mutex<HashMap<Address, BlockHash>>,
    calls: Mutex<Vec<&'static str>>,
    processed: Mutex<Vec<(BlockSubtype, serde_json::Value)>>,
}

impl MockRpc {
    pub fn builder() -> MockRpcBuilder {
        MockRpcBuilder {
            accounts: HashMap::new(),
            receivable: HashMap::new(),
            work_mode: WorkMode::Satisfy,
            reported_hash: None,
            failing: HashMap::new(),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, action: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == action)
            .count()
    }

    pub fn processed(&self) -> Vec<(BlockSubtype, serde_json::Value)> {
        self.processed.lock().unwrap().clone()
    }

    fn record(&self, action: &'static str) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(action);
        match self.failing.get(action) {
            Some(message) => Err(RpcError::InvalidResponse(message.clone()).into()),
            None => Ok(()),
        }
    }
}

pub struct MockRpcBuilder {
    accounts: HashMap<Address, AccountInfo>,
    receivable: HashMap<Address, Vec<ReceivableBlock>>,
    work_mode: WorkMode,
    reported_hash: Option<BlockHash>,
    failing: HashMap<&'static str, String>,
}

impl MockRpcBuilder {
    pub fn with_account(mut self, address: Address, info: AccountInfo) -> Self {
        self.accounts.insert(address, info);
        self
    }

    pub fn with_receivable(mut self, address: Address, hash: BlockHash, amount: Raw) -> Self {
        self.receivable
            .entry(address)
            .or_default()
            .push(ReceivableBlock { hash, amount });
        self
    }

    pub fn with_work_mode(mut self, mode: WorkMode) -> Self {
        self.work_mode = mode;
        self
    }

    /// Make `process` report this hash instead of the submitted block's.
    pub fn with_reported_hash(mut self, hash: BlockHash) -> Self {
        self.reported_hash = Some(hash);
        self
    }

    /// Make `action` fail with a transient protocol error.
    pub fn with_failing(mut self, action: &'static str, message: &str) -> Self {
        self.failing.insert(action, message.to_owned());
        self
    }

    pub fn build(self) -> MockRpc {
        let frontiers = self
            .accounts
            .iter()
            .filter_map(|(address, info)| info.frontier.map(|f| (address.clone(), f)))
            .collect();
        MockRpc {
            accounts: self.accounts,
            receivable: self.receivable,
            work_mode: self.work_mode,
            reported_hash: self.reported_hash,
            failing: self.failing,
            frontiers: Mutex::new(frontiers),
            calls: Mutex::new(Vec::new()),
            processed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NanoRpc for MockRpc {
    async fn account_info(&self, account: &Address) -> Result<AccountInfo, CoreError> {
        self.record("account_info")?;
        self.accounts
            .get(account)
            .cloned()
            .ok_or_else(|| RpcError::Node("Account not found".into()).into())
    }

    async fn receivable(
        &self,
        account: &Address,
        count: u32,
        threshold: &Raw,
    ) -> Result<Vec<ReceivableBlock>, CoreError> {
        self.record("receivable")?;
        Ok(self
            .receivable
            .get(account)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|block| block.amount >= *threshold)
                    .take(count as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn work_generate(
        &self,
        _hash: &BlockHash,
        difficulty: WorkThreshold,
    ) -> Result<WorkGenerated, CoreError> {
        self.record("work_generate")?;
        let work = match self.work_mode {
            WorkMode::Satisfy => Some(Work::new(difficulty.to_string())),
            WorkMode::Missing => None,
            WorkMode::TooWeak => Some(Work::new("0000000000000000")),
        };
        Ok(WorkGenerated {
            work,
            difficulty: Some(difficulty),
        })
    }

    async fn process(
        &self,
        subtype: BlockSubtype,
        block: &serde_json::Value,
    ) -> Result<BlockHash, CoreError> {
        self.record("process")?;
        // Yield so concurrent callers can interleave at the I/O boundary.
        tokio::task::yield_now().await;

        let field = |name: &str| -> Result<String, CoreError> {
            block[name]
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| RpcError::Node(format!("Missing {name}")).into())
        };
        let account = Address::new(field("account")?);
        let previous: BlockHash = field("previous")?.parse()?;
        if field("work")?.is_empty() {
            return Err(RpcError::Node("Block work is insufficient".into()).into());
        }

        let hash = fake_block_hash(block);
        {
            let mut frontiers = self.frontiers.lock().unwrap();
            if let Some(current) = frontiers.get(&account) {
                if *current != previous {
                    return Err(RpcError::Node("Fork".into()).into());
                }
            }
            frontiers.insert(account, hash);
        }
        self.processed.lock().unwrap().push((subtype, block.clone()));

        Ok(self.reported_hash.unwrap_or(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{address, hash_from_byte, raw};

    #[tokio::test]
    async fn receivable_filters_by_threshold_and_count() {
        let me = address("me");
        let rpc = MockRpc::builder()
            .with_receivable(me.clone(), hash_from_byte(1), raw("10"))
            .with_receivable(me.clone(), hash_from_byte(2), raw("1"))
            .with_receivable(me.clone(), hash_from_byte(3), raw("30"))
            .build();

        let blocks = rpc.receivable(&me, 1, &raw("5")).await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].hash, hash_from_byte(1));
        assert_eq!(rpc.call_count("receivable"), 1);
    }

    #[tokio::test]
    async fn process_rejects_stale_previous() {
        let me = address("me");
        let rpc = MockRpc::builder()
            .with_account(
                me.clone(),
                AccountInfo {
                    frontier: Some(hash_from_byte(1)),
                    ..Default::default()
                },
            )
            .build();

        let block = serde_json::json!({
            "account": me,
            "previous": hash_from_byte(9),
            "work": "ffffffffffffffff",
        });
        let err = rpc
            .process(BlockSubtype::Send, &block)
            .await
            .expect_err("stale previous must fork");
        assert_eq!(err.node_message(), Some("Fork"));
    }
}
