//! `Store<T>`: the reactive per-domain container.
//!
//! Holds the list of records plus a loading flag inside a `watch` channel, so
//! readers always see whole snapshots and can await changes. Mutations are
//! synchronous (`send_modify`), never held across an await point.
//!
//! Two counters guard against stale writes:
//! - the **fetch generation** implements "last request wins" for list
//!   fetches: a completed fetch is applied only if no newer one started;
//! - the **epoch** changes on `reset()` (sign-out), so responses that belong
//!   to a previous session are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

use super::Keyed;

/// Point-in-time view of a store.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// Set once a fetch from the server has completed in this session.
    pub hydrated: bool,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            hydrated: false,
        }
    }
}

/// Captured fetch generation. Pass back to [`Store::finish_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    epoch: u64,
}

/// Captured session epoch for a scheduled mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

pub struct Store<T> {
    tx: watch::Sender<Snapshot<T>>,
    /// Last state the server confirmed; the fallback when a resync fails.
    confirmed: Mutex<Vec<T>>,
    generation: AtomicU64,
    epoch: AtomicU64,
}

impl<T: Clone> Store<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::default());
        Self {
            tx,
            confirmed: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.tx.borrow().items.clone()
    }

    /// Run a closure against the current items without cloning them.
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.tx.borrow().items)
    }

    /// Read the last server-confirmed list.
    pub fn read_confirmed<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.lock_confirmed())
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().items.is_empty()
    }

    /// Receive every future snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    pub fn epoch(&self) -> Epoch {
        Epoch(self.epoch.load(Ordering::SeqCst))
    }

    // ── Local mutations ──────────────────────────────────────────────────

    /// Apply a fallible mutation. Subscribers are notified only on `Ok`; on
    /// `Err` the closure must leave the items untouched.
    pub fn try_modify<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut result = None;
        self.tx.send_if_modified(|snapshot| {
            let r = f(&mut snapshot.items);
            let changed = r.is_ok();
            result = Some(r);
            changed
        });
        // send_if_modified always runs the closure exactly once.
        match result {
            Some(r) => r,
            None => unreachable!("send_if_modified skipped its closure"),
        }
    }

    pub fn modify<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.try_modify::<R, std::convert::Infallible>(|items| Ok(f(items)))
            .unwrap_or_else(|never| match never {})
    }

    /// Run a rollback mutation if the session has not changed since `epoch`.
    pub fn rollback(&self, epoch: Epoch, f: impl FnOnce(&mut Vec<T>)) -> bool {
        if self.epoch() != epoch {
            return false;
        }
        self.modify(f);
        true
    }

    /// Replace the items with the last server-confirmed state.
    pub fn restore_confirmed(&self, epoch: Epoch) -> bool {
        if self.epoch() != epoch {
            return false;
        }
        let confirmed = self.lock_confirmed().clone();
        self.tx.send_modify(|s| s.items = confirmed);
        true
    }

    // ── Fetch lifecycle ──────────────────────────────────────────────────

    /// Start a list fetch: bumps the generation and raises the loading flag.
    pub fn begin_fetch(&self) -> FetchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|s| s.loading = true);
        FetchTicket {
            generation,
            epoch: self.epoch.load(Ordering::SeqCst),
        }
    }

    /// Complete a fetch. Applies `items` only if `ticket` is still the latest
    /// fetch of the current session; returns whether it was applied.
    pub fn finish_fetch(&self, ticket: FetchTicket, items: Option<Vec<T>>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                "Discarding superseded fetch result"
            );
            return false;
        }
        match items {
            Some(items) => {
                *self.lock_confirmed() = items.clone();
                self.tx.send_modify(|s| {
                    s.items = items;
                    s.loading = false;
                    s.hydrated = true;
                });
            }
            None => self.tx.send_modify(|s| s.loading = false),
        }
        true
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation.load(Ordering::SeqCst)
            && ticket.epoch == self.epoch.load(Ordering::SeqCst)
    }

    /// Replace everything with an authoritative list, bypassing reconciliation.
    pub fn replace(&self, epoch: Epoch, items: Vec<T>) -> bool {
        if self.epoch() != epoch {
            return false;
        }
        *self.lock_confirmed() = items.clone();
        self.tx.send_modify(|s| {
            s.items = items;
            s.hydrated = true;
        });
        true
    }

    /// Start a new epoch without touching the items. Responses to calls made
    /// before this point will be discarded.
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }

    /// Empty the store and start a new epoch. In-flight fetches and
    /// mutations from before the reset will be discarded.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.lock_confirmed().clear();
        self.tx.send_modify(|s| *s = Snapshot::default());
    }

    fn lock_confirmed(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        // A poisoned lock only means a panic elsewhere; the Vec is still valid.
        self.confirmed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone + Keyed> Store<T> {
    /// Record a server response without touching what readers see. Used
    /// while other mutations are still scheduled: showing this list now
    /// would undo their local changes.
    pub fn confirm(&self, epoch: Epoch, server: Vec<T>) -> bool {
        if self.epoch() != epoch {
            tracing::debug!("Discarding response from a previous session");
            return false;
        }
        *self.lock_confirmed() = server;
        true
    }

    /// Make the last confirmed list visible. Call only once nothing is
    /// scheduled: a provisional record the server does not list then has no
    /// call left that could create it, and is dropped.
    pub fn adopt_confirmed(&self, epoch: Epoch) -> bool {
        if self.epoch() != epoch {
            return false;
        }
        let server = self.lock_confirmed().clone();
        self.tx.send_modify(|s| {
            let dropped = s
                .items
                .iter()
                .filter(|local| {
                    local.is_provisional() && !server.iter().any(|r| r.key() == local.key())
                })
                .count();
            if dropped > 0 {
                tracing::debug!(dropped, "Dropping provisional records the server does not have");
            }
            s.items = server;
            s.hydrated = true;
        });
        true
    }
}

impl<T: Clone> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}
