//! Block construction, proof, submission and commit for one account.
//!
//! Every chain-mutating call runs the same template:
//!
//! ```text
//! IDLE -> BUILDING -> AWAITING_WORK -> SUBMITTING -> COMMITTED
//!             \             \              \
//!              +-------------+--------------+-> FAILED (state untouched)
//! ```
//!
//! Calls are serialized per wallet: a caller that arrives while another
//! operation is in flight waits for it and then builds on the frontier it
//! committed. The snapshot is only written once, after the node has
//! accepted the block and reported the hash we computed.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::account::{AccountState, AccountStatePatch};
use crate::error::CoreError;
use crate::primitives::{BlockFields, LedgerPrimitives, Link};
use crate::rpc::{BlockSubtype, NanoRpc};
use crate::settings::WalletSettings;
use crate::state::StateStore;
use crate::sync::{ReceivableSet, Synchronizer};
use crate::types::{Account, Address, BlockHash, PrivateKey, Raw};
use crate::work::{WorkPrecomputer, WorkProvider};

/// Phase of an in-flight chain operation, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Building,
    AwaitingWork,
    Submitting,
    Committed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => write!(f, "building"),
            Self::AwaitingWork => write!(f, "awaiting_work"),
            Self::Submitting => write!(f, "submitting"),
            Self::Committed => write!(f, "committed"),
        }
    }
}

#[derive(Debug, Clone)]
enum Operation {
    Send { to: Address, amount: Raw },
    Receive { hash: BlockHash },
    Sweep { to: Address },
    ChangeRepresentative { representative: Address },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send",
            Self::Receive { .. } => "receive",
            Self::Sweep { .. } => "sweep",
            Self::ChangeRepresentative { .. } => "change_representative",
        }
    }
}

/// Everything decided before any I/O happens.
struct Plan {
    subtype: BlockSubtype,
    previous: BlockHash,
    representative: Address,
    balance: Raw,
    link: Link,
    /// The receivable block this operation consumes, if any.
    received: Option<BlockHash>,
    /// Applied on acceptance, together with the new frontier.
    commit: AccountStatePatch,
}

pub struct Wallet {
    account: Account,
    key: PrivateKey,
    rpc: Arc<dyn NanoRpc>,
    primitives: Arc<dyn LedgerPrimitives>,
    state: Arc<StateStore<AccountState>>,
    settings: Arc<StateStore<WalletSettings>>,
    synchronizer: Synchronizer,
    work: Arc<WorkProvider>,
    // Held here because the store only keeps a weak reference.
    _precomputer: Option<Arc<WorkPrecomputer>>,
    chain_lock: Mutex<()>,
}

impl Wallet {
    /// Derive the account from `key` and wire the wallet's components.
    ///
    /// `initial` seeds the account snapshot (for example from a file the
    /// caller persisted through a subscription); `None` starts from the
    /// unopened default.
    pub async fn new(
        key: PrivateKey,
        settings: WalletSettings,
        initial: Option<AccountState>,
        rpc: Arc<dyn NanoRpc>,
        primitives: Arc<dyn LedgerPrimitives>,
    ) -> Result<Self, CoreError> {
        let account = primitives.derive_account(&key)?;
        if let Some(representative) = &settings.default_representative {
            if !primitives.is_valid_address(representative) {
                return Err(CoreError::InvalidAddress(representative.to_string()));
            }
        }

        let precompute = settings
            .precompute_work
            .then_some(settings.send_threshold);
        let state = Arc::new(StateStore::new(initial.unwrap_or_default()));
        let settings = Arc::new(StateStore::new(settings));
        let synchronizer = Synchronizer::new(
            account.address.clone(),
            rpc.clone(),
            state.clone(),
            settings.clone(),
        );
        let work = Arc::new(WorkProvider::new(
            rpc.clone(),
            primitives.clone(),
            state.clone(),
        ));

        let precomputer = match precompute {
            Some(threshold) => {
                let precomputer = Arc::new(WorkPrecomputer::new(work.clone(), threshold));
                state.subscribe(&precomputer).await;
                Some(precomputer)
            }
            None => None,
        };

        info!(account = %account.address, "wallet ready");
        Ok(Self {
            account,
            key,
            rpc,
            primitives,
            state,
            settings,
            synchronizer,
            work,
            _precomputer: precomputer,
            chain_lock: Mutex::new(()),
        })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The account snapshot store; subscribe here to persist state.
    pub fn state(&self) -> &Arc<StateStore<AccountState>> {
        &self.state
    }

    pub fn settings(&self) -> &Arc<StateStore<WalletSettings>> {
        &self.settings
    }

    pub fn work_provider(&self) -> &Arc<WorkProvider> {
        &self.work
    }

    pub async fn sync(&self) -> Result<Arc<AccountState>, CoreError> {
        self.synchronizer.sync().await
    }

    pub async fn receivable(&self) -> Result<ReceivableSet, CoreError> {
        self.synchronizer.receivable().await
    }

    pub async fn send(&self, to: &Address, amount: &Raw) -> Result<BlockHash, CoreError> {
        self.execute(Operation::Send {
            to: to.clone(),
            amount: amount.clone(),
        })
        .await
    }

    /// Receive a block from the current receivable list.
    pub async fn receive(&self, hash: &BlockHash) -> Result<BlockHash, CoreError> {
        self.execute(Operation::Receive { hash: *hash }).await
    }

    /// Receive every block in the current receivable list, in order.
    /// Stops at the first failure; blocks received before it stay committed.
    pub async fn receive_all(&self) -> Result<Vec<BlockHash>, CoreError> {
        let pending: Vec<BlockHash> = self
            .state
            .get()
            .await
            .receivable
            .iter()
            .map(|block| block.hash)
            .collect();

        let mut received = Vec::with_capacity(pending.len());
        for hash in pending {
            received.push(self.receive(&hash).await?);
        }
        Ok(received)
    }

    /// Send the whole balance to `to`.
    pub async fn sweep(&self, to: &Address) -> Result<BlockHash, CoreError> {
        self.execute(Operation::Sweep { to: to.clone() }).await
    }

    pub async fn set_representative(
        &self,
        representative: &Address,
    ) -> Result<BlockHash, CoreError> {
        self.execute(Operation::ChangeRepresentative {
            representative: representative.clone(),
        })
        .await
    }

    async fn execute(&self, operation: Operation) -> Result<BlockHash, CoreError> {
        let _guard = self.chain_lock.lock().await;
        let op = operation.name();

        let result = self.run(&operation).await;
        if let Err(err) = &result {
            warn!(account = %self.account.address, op, error = %err, "chain operation failed");
        }
        result
    }

    /// Work is always rooted on `previous`: the frontier, or the account's
    /// public key for an open block.
    async fn run(&self, operation: &Operation) -> Result<BlockHash, CoreError> {
        let op = operation.name();
        let state = self.state.get().await;
        let settings = self.settings.get().await;

        debug!(account = %self.account.address, op, phase = %Phase::Building);
        let plan = self.plan(operation, &state, &settings)?;
        let built = self.primitives.build_block(
            &self.key,
            &BlockFields {
                account: self.account.address.clone(),
                previous: plan.previous,
                representative: plan.representative.clone(),
                balance: plan.balance.clone(),
                link: plan.link.clone(),
            },
        )?;

        debug!(
            account = %self.account.address,
            op,
            phase = %Phase::AwaitingWork,
            block = %built.hash
        );
        let threshold = match plan.subtype {
            BlockSubtype::Open | BlockSubtype::Receive => settings.receive_threshold,
            BlockSubtype::Send | BlockSubtype::Change => settings.send_threshold,
        };
        let work = self.work.obtain(&plan.previous, threshold).await?;

        debug!(
            account = %self.account.address,
            op,
            phase = %Phase::Submitting,
            block = %built.hash
        );
        let reported = self
            .rpc
            .process(plan.subtype, &built.with_work(&work))
            .await?;
        if reported != built.hash {
            return Err(CoreError::Integrity {
                expected: built.hash,
                reported,
            });
        }

        // Receivable refreshes may have landed while this operation was in
        // flight, so the consumed block is removed from the current list.
        let commit = plan.commit.frontier(Some(built.hash));
        let received = plan.received;
        self.state
            .update_with(move |current| match received {
                Some(hash) => commit.receivable(
                    current
                        .receivable
                        .iter()
                        .filter(|block| block.hash != hash)
                        .cloned()
                        .collect(),
                ),
                None => commit,
            })
            .await;
        info!(
            account = %self.account.address,
            op,
            phase = %Phase::Committed,
            block = %built.hash,
            balance = %plan.balance,
            "block committed"
        );
        Ok(built.hash)
    }

    /// Check preconditions and compute the block and its commit from the
    /// current snapshot. Performs no I/O.
    fn plan(
        &self,
        operation: &Operation,
        state: &AccountState,
        settings: &WalletSettings,
    ) -> Result<Plan, CoreError> {
        let current_representative = || {
            state
                .representative
                .clone()
                .or_else(|| settings.default_representative.clone())
                .ok_or(CoreError::NoRepresentative)
        };
        let frontier = || state.frontier.ok_or(CoreError::NoFrontier);

        let (subtype, previous, representative, balance, link, received) = match operation {
            Operation::Receive { hash } => {
                let block = state
                    .find_receivable(hash)
                    .ok_or(CoreError::MissingReceivable(*hash))?;
                let (subtype, previous) = match state.frontier {
                    Some(frontier) => (BlockSubtype::Receive, frontier),
                    None => (BlockSubtype::Open, self.account.public_key.as_root()),
                };
                (
                    subtype,
                    previous,
                    current_representative()?,
                    state.balance.checked_add(&block.amount),
                    Link::Receivable(*hash),
                    Some(*hash),
                )
            }
            Operation::Send { to, amount } => {
                let previous = frontier()?;
                self.check_address(to)?;
                if amount.is_zero() {
                    return Err(CoreError::InvalidAmount("cannot send 0 raw".to_owned()));
                }
                let balance = state.balance.checked_sub(amount).ok_or_else(|| {
                    CoreError::InsufficientBalance {
                        balance: state.balance.clone(),
                        amount: amount.clone(),
                    }
                })?;
                (
                    BlockSubtype::Send,
                    previous,
                    current_representative()?,
                    balance,
                    Link::Destination(to.clone()),
                    None,
                )
            }
            Operation::Sweep { to } => {
                let previous = frontier()?;
                self.check_address(to)?;
                if state.balance.is_zero() {
                    return Err(CoreError::InvalidAmount("nothing to sweep".to_owned()));
                }
                (
                    BlockSubtype::Send,
                    previous,
                    current_representative()?,
                    Raw::zero(),
                    Link::Destination(to.clone()),
                    None,
                )
            }
            Operation::ChangeRepresentative { representative } => {
                let previous = frontier()?;
                self.check_address(representative)?;
                (
                    BlockSubtype::Change,
                    previous,
                    representative.clone(),
                    state.balance.clone(),
                    Link::Empty,
                    None,
                )
            }
        };

        let commit = AccountStatePatch::default()
            .balance(balance.clone())
            .representative(Some(representative.clone()));
        Ok(Plan {
            subtype,
            previous,
            representative,
            balance,
            link,
            received,
            commit,
        })
    }

    fn check_address(&self, address: &Address) -> Result<(), CoreError> {
        if self.primitives.is_valid_address(address) {
            Ok(())
        } else {
            Err(CoreError::InvalidAddress(address.to_string()))
        }
    }
}
