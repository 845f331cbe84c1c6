//! Reconciles the local account snapshot with the remote ledger.

use std::sync::Arc;

use tracing::{debug, info};

use crate::account::{AccountState, AccountStatePatch, ReceivableBlock};
use crate::error::CoreError;
use crate::rpc::{AccountInfo, NanoRpc};
use crate::settings::WalletSettings;
use crate::state::StateStore;
use crate::types::{Address, Raw};

/// The node's message for an account with no committed blocks.
const ACCOUNT_NOT_FOUND: &str = "Account not found";

/// Receivable blocks as of one fetch, with their exact total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivableSet {
    pub blocks: Vec<ReceivableBlock>,
    pub total: Raw,
}

pub struct Synchronizer {
    address: Address,
    rpc: Arc<dyn NanoRpc>,
    state: Arc<StateStore<AccountState>>,
    settings: Arc<StateStore<WalletSettings>>,
}

impl Synchronizer {
    pub fn new(
        address: Address,
        rpc: Arc<dyn NanoRpc>,
        state: Arc<StateStore<AccountState>>,
        settings: Arc<StateStore<WalletSettings>>,
    ) -> Self {
        Self {
            address,
            rpc,
            state,
            settings,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Pull account info and the receivable set, and commit both in one update.
    pub async fn sync(&self) -> Result<Arc<AccountState>, CoreError> {
        let info = self.account_info().await?;
        let receivable = self.fetch_receivable().await?;

        info!(
            account = %self.address,
            frontier = ?info.frontier,
            balance = %info.balance,
            receivable = receivable.blocks.len(),
            receivable_total = %receivable.total,
            "account synced"
        );
        let snapshot = self
            .state
            .update(
                AccountStatePatch::default()
                    .frontier(info.frontier)
                    .balance(info.balance)
                    .representative(info.representative)
                    .receivable(receivable.blocks),
            )
            .await;
        Ok(snapshot)
    }

    /// Fetch and commit only the receivable set.
    pub async fn receivable(&self) -> Result<ReceivableSet, CoreError> {
        let receivable = self.fetch_receivable().await?;
        self.state
            .update(AccountStatePatch::default().receivable(receivable.blocks.clone()))
            .await;
        Ok(receivable)
    }

    /// Remote account view. An unopened account is reported as the zero
    /// state rather than as an error.
    pub async fn account_info(&self) -> Result<AccountInfo, CoreError> {
        match self.rpc.account_info(&self.address).await {
            Ok(info) => Ok(info),
            Err(err) if err.node_message() == Some(ACCOUNT_NOT_FOUND) => {
                debug!(account = %self.address, "account not opened yet");
                Ok(AccountInfo::unopened())
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_receivable(&self) -> Result<ReceivableSet, CoreError> {
        let settings = self.settings.get().await;
        let blocks = self
            .rpc
            .receivable(
                &self.address,
                settings.receivable_count,
                &settings.min_receivable,
            )
            .await?;
        let total = Raw::sum(blocks.iter().map(|block| &block.amount));
        debug!(
            account = %self.address,
            blocks = blocks.len(),
            %total,
            "fetched receivable blocks"
        );
        Ok(ReceivableSet { blocks, total })
    }
}
