//! Copy-on-write snapshot store with change notification.
//!
//! [`StateStore`] owns a single `Arc<S>` snapshot. Writers build a new
//! snapshot from the current one under the write lock and swap it in, so
//! readers always hold a complete, immutable view. After every commit the
//! store fans the new snapshot out to subscribed listeners and waits for all
//! of them before the update resolves.
//!
//! Listeners are held by `Weak` reference: the store never keeps a listener
//! alive, and registrations whose listener has been dropped are pruned on
//! the next notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::CoreError;

/// A snapshot type that can absorb a partial update.
pub trait Snapshot: Clone + Default + Send + Sync + 'static {
    /// Field-wise partial update. `None` fields leave the snapshot untouched.
    type Patch: Send;

    fn apply(&mut self, patch: Self::Patch);
}

/// What a listener is told after a commit.
#[derive(Debug, Clone)]
pub enum StateChange<S> {
    Updated(Arc<S>),
    /// The store was restored to its default snapshot.
    Reset(Arc<S>),
}

impl<S> StateChange<S> {
    pub fn snapshot(&self) -> &Arc<S> {
        match self {
            Self::Updated(snapshot) | Self::Reset(snapshot) => snapshot,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset(_))
    }
}

#[async_trait]
pub trait StateListener<S: Snapshot>: Send + Sync {
    async fn on_change(&self, change: &StateChange<S>) -> Result<(), CoreError>;
}

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct StateStore<S: Snapshot> {
    current: RwLock<Arc<S>>,
    listeners: Mutex<Vec<(ListenerId, Weak<dyn StateListener<S>>)>>,
    next_listener: AtomicU64,
}

impl<S: Snapshot> Default for StateStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Snapshot> StateStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    /// The current snapshot.
    pub async fn get(&self) -> Arc<S> {
        self.current.read().await.clone()
    }

    /// Merge `patch` into the current snapshot and notify listeners.
    pub async fn update(&self, patch: S::Patch) -> Arc<S> {
        self.update_with(|_| patch).await
    }

    /// Like [`update`](Self::update), but the patch is derived from the
    /// snapshot current at commit time, under the write lock.
    pub async fn update_with<F>(&self, build: F) -> Arc<S>
    where
        F: FnOnce(&S) -> S::Patch + Send,
    {
        let next = {
            let mut guard = self.current.write().await;
            let mut next = (**guard).clone();
            let patch = build(&next);
            next.apply(patch);
            let next = Arc::new(next);
            *guard = next.clone();
            next
        };
        self.notify(StateChange::Updated(next.clone())).await;
        next
    }

    /// Replace the snapshot wholesale and notify listeners.
    pub async fn overwrite(&self, snapshot: S) -> Arc<S> {
        let next = Arc::new(snapshot);
        *self.current.write().await = next.clone();
        self.notify(StateChange::Updated(next.clone())).await;
        next
    }

    /// Restore the default snapshot and notify listeners with a reset marker.
    pub async fn reset(&self) -> Arc<S> {
        let next = Arc::new(S::default());
        *self.current.write().await = next.clone();
        self.notify(StateChange::Reset(next.clone())).await;
        next
    }

    pub async fn subscribe<L>(&self, listener: &Arc<L>) -> ListenerId
    where
        L: StateListener<S> + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn StateListener<S>> = weak;
        self.listeners.lock().await.push((id, weak));
        id
    }

    /// Remove a registration. Returns `false` if `id` was not registered.
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().await;
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Number of registrations whose listener is still alive.
    pub async fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .await
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    async fn notify(&self, change: StateChange<S>) {
        // Upgrade under the lock, call outside it so listeners may
        // subscribe, unsubscribe or update the store themselves.
        let live: Vec<Arc<dyn StateListener<S>>> = {
            let mut listeners = self.listeners.lock().await;
            listeners.retain(|(_, weak)| weak.strong_count() > 0);
            listeners
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };
        if live.is_empty() {
            return;
        }

        debug!(
            listeners = live.len(),
            reset = change.is_reset(),
            "notifying state listeners"
        );
        let results = join_all(live.iter().map(|listener| listener.on_change(&change))).await;
        for err in results.into_iter().filter_map(Result::err) {
            warn!(error = %err, "state listener failed");
        }
    }
}
