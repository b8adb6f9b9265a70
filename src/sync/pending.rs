//! `PendingMutations`: debounced, deduplicated backend calls.
//!
//! Every scheduled call has an operation key (`add_<product>_<size>_<color>`,
//! `update_…`). For one key:
//! - scheduling again before the timer fires replaces the pending call;
//! - at most one call is in flight; a call whose timer fires while another is
//!   running waits for it, then runs only if it is still the latest.
//!
//! The latest intent always wins; intermediate intents may never be sent.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Entry {
    generation: u64,
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

type KeyLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<String, Entry>>,
    /// Serializes calls per key. Outlives the entries, so a call that is
    /// still running after `cancel_all` keeps its key locked.
    locks: Mutex<HashMap<String, KeyLock>>,
    next_generation: AtomicU64,
    /// Fires when the table becomes empty.
    idle: Notify,
    /// Fires whenever an entry leaves the table.
    changed: Notify,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn key_lock(&self, key: &str) -> KeyLock {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only the map holds these: no task is queued on them.
        locks.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
        Arc::clone(
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Mark the call running if it is still the latest for `key`.
    fn start(&self, key: &str, generation: u64, running: &AtomicBool) -> bool {
        let entries = self.entries();
        let current = entries
            .get(key)
            .map(|e| e.generation == generation)
            .unwrap_or(false);
        if current {
            running.store(true, Ordering::SeqCst);
        }
        current
    }

    fn finish(&self, key: &str, generation: u64) {
        let mut entries = self.entries();
        if entries.get(key).map(|e| e.generation) == Some(generation) {
            entries.remove(key);
            self.changed.notify_waiters();
        }
        if entries.is_empty() {
            self.idle.notify_waiters();
        }
    }
}

/// Calls that were already running when the table was cleared.
#[derive(Debug, Default)]
pub struct InFlight(Vec<JoinHandle<()>>);

impl InFlight {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wait for every one of them to complete.
    pub async fn wait(self) {
        for handle in self.0 {
            let _ = handle.await;
        }
    }
}

/// Key-indexed table of scheduled backend calls.
#[derive(Clone, Default)]
pub struct PendingMutations {
    inner: Arc<Inner>,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `op` to run after `delay`, replacing any call still waiting
    /// under the same key.
    pub fn schedule<F, Fut>(&self, key: impl Into<String>, delay: Duration, op: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Hold the table lock across the spawn so the task cannot check
        // `start` before its entry exists.
        let mut entries = self.inner.entries();
        let key_lock = self.inner.key_lock(&key);
        let running = Arc::new(AtomicBool::new(false));

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task_lock = key_lock;
        let task_running = Arc::clone(&running);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _guard = task_lock.lock().await;
            if !inner.start(&task_key, generation, &task_running) {
                return;
            }
            tracing::debug!(key = %task_key, "Running pending mutation");
            op().await;
            inner.finish(&task_key, generation);
        });

        let replaced = entries.insert(
            key.clone(),
            Entry {
                generation,
                handle,
                running,
            },
        );
        if let Some(previous) = replaced {
            if !previous.running.load(Ordering::SeqCst) {
                previous.handle.abort();
            }
            tracing::debug!(key = %key, "Replaced pending mutation");
        }
    }

    /// Cancel the call waiting under `key`. Returns `false` if there was none
    /// or it is already running (a running call cannot be taken back).
    pub fn cancel(&self, key: &str) -> bool {
        let mut entries = self.inner.entries();
        let cancellable = entries
            .get(key)
            .map(|e| !e.running.load(Ordering::SeqCst))
            .unwrap_or(false);
        if !cancellable {
            return false;
        }
        if let Some(entry) = entries.remove(key) {
            entry.handle.abort();
            self.inner.changed.notify_waiters();
        }
        if entries.is_empty() {
            self.inner.idle.notify_waiters();
        }
        true
    }

    /// Drop every waiting call. Running calls complete and are returned so
    /// the caller can wait for them; their key stays locked until they do.
    pub fn cancel_all(&self) -> InFlight {
        let mut entries = self.inner.entries();
        let mut running = Vec::new();
        for (_, entry) in entries.drain() {
            if entry.running.load(Ordering::SeqCst) {
                running.push(entry.handle);
            } else {
                entry.handle.abort();
            }
        }
        self.inner.changed.notify_waiters();
        self.inner.idle.notify_waiters();
        InFlight(running)
    }

    /// Whether the call running under `key` is the only entry left: nothing
    /// else is scheduled, and nothing newer replaced it.
    pub fn is_quiet(&self, key: &str) -> bool {
        let entries = self.inner.entries();
        entries.len() == 1
            && entries
                .get(key)
                .map(|e| e.running.load(Ordering::SeqCst))
                .unwrap_or(false)
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.inner.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries().is_empty()
    }

    /// Wait until nothing is scheduled or in flight under `key`.
    pub async fn wait_for(&self, key: &str) {
        loop {
            let notified = self.inner.changed.notified();
            if !self.is_pending(key) {
                return;
            }
            notified.await;
        }
    }

    /// Wait until no call is scheduled or in flight.
    pub async fn settled(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.is_empty() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for PendingMutations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.inner.entries().keys().cloned().collect();
        f.debug_struct("PendingMutations").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::{BoxFuture, FutureExt};
    use std::sync::atomic::AtomicU32;

    type Op = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Op) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |value: u32| -> Op {
            let sink = sink.clone();
            Box::new(move || {
                async move {
                    sink.lock().unwrap().push(value);
                }
                .boxed()
            })
        };
        (log, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_same_key_keeps_latest() {
        let pending = PendingMutations::new();
        let (log, make) = recorder();

        pending.schedule("update_a", Duration::from_millis(500), make(1));
        tokio::time::sleep(Duration::from_millis(200)).await;
        pending.schedule("update_a", Duration::from_millis(500), make(2));
        assert_eq!(pending.len(), 1);

        pending.settled().await;
        assert_eq!(*log.lock().unwrap(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_both_run() {
        let pending = PendingMutations::new();
        let (log, make) = recorder();

        pending.schedule("add_a", Duration::from_millis(100), make(1));
        pending.schedule("add_b", Duration::from_millis(100), make(2));
        pending.settled().await;

        let mut ran = log.lock().unwrap().clone();
        ran.sort();
        assert_eq!(ran, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_call_in_flight_per_key() {
        let pending = PendingMutations::new();
        let active = Arc::new(AtomicU32::new(0));
        let peak = Arc::new(AtomicU32::new(0));
        let completed = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let (active, peak, completed) = (active.clone(), peak.clone(), completed.clone());
            pending.schedule("update_a", Duration::from_millis(10), move || async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(300)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                completed.fetch_add(1, Ordering::SeqCst);
            });
            // Let the first call start before scheduling the second.
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        pending.settled().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire() {
        let pending = PendingMutations::new();
        let (log, make) = recorder();

        pending.schedule("add_a", Duration::from_millis(100), make(1));
        assert!(pending.cancel("add_a"));
        assert!(!pending.cancel("add_a"));
        assert!(!pending.is_pending("add_a"));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let pending = PendingMutations::new();
        let (log, make) = recorder();

        pending.schedule("a", Duration::from_millis(100), make(1));
        pending.schedule("b", Duration::from_millis(100), make(2));
        assert!(pending.cancel_all().is_empty());
        pending.settled().await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_keeps_running_key_locked() {
        let pending = PendingMutations::new();
        let active = Arc::new(AtomicU32::new(0));
        let peak = Arc::new(AtomicU32::new(0));
        let completed = Arc::new(AtomicU32::new(0));
        let slow_call = || {
            let (active, peak, completed) = (active.clone(), peak.clone(), completed.clone());
            move || async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(300)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                completed.fetch_add(1, Ordering::SeqCst);
            }
        };

        pending.schedule("add_p1_M_Black", Duration::from_millis(10), slow_call());
        tokio::time::sleep(Duration::from_millis(50)).await;

        let in_flight = pending.cancel_all();
        assert!(!in_flight.is_empty());
        assert!(pending.is_empty());
        pending.schedule("add_p1_M_Black", Duration::from_millis(10), slow_call());

        in_flight.wait().await;
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        pending.settled().await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_key() {
        let pending = PendingMutations::new();
        let (log, make) = recorder();

        pending.schedule("add_a", Duration::from_millis(100), make(1));
        pending.schedule("add_b", Duration::from_secs(5), make(2));
        pending.wait_for("add_a").await;

        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert!(pending.is_pending("add_b"));
        // Nothing pending under this key: returns at once.
        pending.wait_for("missing").await;
    }
}
