//! Proof-of-work acquisition with single-entry reuse.
//!
//! The account snapshot carries at most one cached solution. It is reused
//! only for the exact hash it was generated for and only when it was
//! generated at a difficulty at least as strict as the one requested.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::account::{AccountState, AccountStatePatch, CachedWork};
use crate::error::CoreError;
use crate::primitives::LedgerPrimitives;
use crate::rpc::NanoRpc;
use crate::state::{StateChange, StateListener, StateStore};
use crate::types::{BlockHash, Work, WorkThreshold};

pub struct WorkProvider {
    rpc: Arc<dyn NanoRpc>,
    primitives: Arc<dyn LedgerPrimitives>,
    state: Arc<StateStore<AccountState>>,
}

impl WorkProvider {
    pub fn new(
        rpc: Arc<dyn NanoRpc>,
        primitives: Arc<dyn LedgerPrimitives>,
        state: Arc<StateStore<AccountState>>,
    ) -> Self {
        Self {
            rpc,
            primitives,
            state,
        }
    }

    /// Work for `hash` at `threshold` or stricter.
    ///
    /// The cache is only overwritten after the generated solution has been
    /// verified, so a bad work server can never poison it.
    pub async fn obtain(&self, hash: &BlockHash, threshold: WorkThreshold) -> Result<Work, CoreError> {
        let snapshot = self.state.get().await;
        if let Some(cached) = snapshot.work.as_ref() {
            if cached.satisfies(hash, threshold) {
                debug!(%hash, %threshold, "reusing cached work");
                return Ok(cached.work.clone());
            }
        }

        debug!(%hash, %threshold, "requesting work");
        let generated = self.rpc.work_generate(hash, threshold).await?;
        let work = generated.work.ok_or(CoreError::MissingWork(*hash))?;
        if !self.primitives.validate_work(hash, threshold, &work) {
            return Err(CoreError::InvalidWork {
                hash: *hash,
                threshold,
                work: work.to_string(),
            });
        }

        self.state
            .update(AccountStatePatch::default().work(Some(CachedWork {
                hash: *hash,
                threshold,
                work: work.clone(),
            })))
            .await;
        Ok(work)
    }

    /// Fire-and-forget [`obtain`](Self::obtain). Failures are logged only.
    pub fn precompute(self: &Arc<Self>, hash: BlockHash, threshold: WorkThreshold) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            match provider.obtain(&hash, threshold).await {
                Ok(_) => debug!(%hash, %threshold, "precomputed work"),
                Err(err) => warn!(%hash, %threshold, error = %err, "work precompute failed"),
            }
        })
    }
}

// ==============================================================================
// Frontier-driven precomputation
// ==============================================================================

/// State listener that precomputes work whenever the frontier moves.
///
/// Never fails the notifying update: generation runs on a detached task.
pub struct WorkPrecomputer {
    provider: Arc<WorkProvider>,
    threshold: WorkThreshold,
    last_frontier: Mutex<Option<BlockHash>>,
}

impl WorkPrecomputer {
    pub fn new(provider: Arc<WorkProvider>, threshold: WorkThreshold) -> Self {
        Self {
            provider,
            threshold,
            last_frontier: Mutex::new(None),
        }
    }
}

#[async_trait]
impl StateListener<AccountState> for WorkPrecomputer {
    async fn on_change(&self, change: &StateChange<AccountState>) -> Result<(), CoreError> {
        let frontier = change.snapshot().frontier;
        let mut last = self.last_frontier.lock().await;
        if change.is_reset() || frontier.is_none() {
            *last = frontier;
            return Ok(());
        }
        if *last == frontier {
            return Ok(());
        }
        *last = frontier;

        if let Some(hash) = frontier {
            let already_cached = change
                .snapshot()
                .work
                .as_ref()
                .is_some_and(|cached| cached.satisfies(&hash, self.threshold));
            if !already_cached {
                self.provider.precompute(hash, self.threshold);
            }
        }
        Ok(())
    }
}
