//! `Optimistic<T>`: apply locally now, sync in the background.
//!
//! ```text
//! Idle ─apply─▶ OptimisticallyApplied ─debounce─▶ Syncing ─ok──▶ Reconciled ─▶ Idle
//!                                                          └err─▶ RolledBack ─▶ Idle
//! ```
//!
//! A rejected local mutation (quantity cap, duplicate) never reaches the
//! backend: the store is untouched and nothing is scheduled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use super::pending::PendingMutations;
use super::store::Store;
use super::Keyed;
use crate::error::SdkError;
use crate::notice::Notifier;

/// Refetches the authoritative list for a store.
pub type Resync<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>, SdkError>> + Send + Sync>;

/// What to do when the backend call fails.
pub enum OnFailure<T> {
    /// Undo exactly the optimistic change (e.g. drop a just-added record).
    Discard(Box<dyn FnOnce(&mut Vec<T>) + Send>),
    /// Refetch the whole list from the server.
    Resync,
}

impl<T> OnFailure<T> {
    pub fn discard(f: impl FnOnce(&mut Vec<T>) + Send + 'static) -> Self {
        OnFailure::Discard(Box::new(f))
    }
}

/// Coordinates optimistic mutations for one store.
pub struct Optimistic<T> {
    store: Arc<Store<T>>,
    pending: PendingMutations,
    notifier: Notifier,
    resync: Resync<T>,
    domain: &'static str,
}

impl<T> Optimistic<T>
where
    T: Clone + Keyed + Send + Sync + 'static,
{
    pub fn new(
        domain: &'static str,
        store: Arc<Store<T>>,
        notifier: Notifier,
        resync: Resync<T>,
    ) -> Self {
        Self {
            store,
            pending: PendingMutations::new(),
            notifier,
            resync,
            domain,
        }
    }

    pub fn store(&self) -> &Arc<Store<T>> {
        &self.store
    }

    pub fn pending(&self) -> &PendingMutations {
        &self.pending
    }

    /// Apply `local` to the store immediately, then schedule `remote` under
    /// `key` after `debounce`.
    ///
    /// `remote` resolves to the authoritative list (`Some`) or to `None` when
    /// there turned out to be nothing to send. Responses are shown once no
    /// other call for this store is scheduled. On failure the store is rolled
    /// back per `on_failure` and an error notice is emitted; aborts are
    /// ignored.
    pub fn apply<R, L, F, Fut>(
        &self,
        key: impl Into<String>,
        local: L,
        remote: F,
        debounce: Duration,
        on_failure: OnFailure<T>,
    ) -> Result<R, SdkError>
    where
        L: FnOnce(&mut Vec<T>) -> Result<R, SdkError>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<Vec<T>>, SdkError>> + Send + 'static,
    {
        let out = self.store.try_modify(local)?;

        let key = key.into();
        let epoch = self.store.epoch();
        let store = Arc::clone(&self.store);
        let notifier = self.notifier.clone();
        let resync = Arc::clone(&self.resync);
        let domain = self.domain;
        let task_key = key.clone();
        let pending = self.pending.clone();

        self.pending.schedule(key, debounce, move || async move {
            match remote().await {
                Ok(server) => {
                    if let Some(server) = server {
                        store.confirm(epoch, server);
                    }
                    // The last call to land shows the server's list.
                    if pending.is_quiet(&task_key) {
                        store.adopt_confirmed(epoch);
                    }
                }
                Err(e) if e.is_aborted() => {}
                Err(e) => {
                    tracing::warn!(domain, key = %task_key, error = %e, "Sync failed, rolling back");
                    notifier.error(e.user_message());
                    match on_failure {
                        OnFailure::Discard(undo) => {
                            store.rollback(epoch, undo);
                        }
                        OnFailure::Resync => resync_or_restore(domain, &store, epoch, &resync).await,
                    }
                }
            }
        });

        Ok(out)
    }

    /// Refetch now, falling back to the last confirmed state on failure.
    pub async fn resync_now(&self) {
        resync_or_restore(self.domain, &self.store, self.store.epoch(), &self.resync).await;
    }

    /// Drop everything scheduled and empty the store.
    pub fn reset(&self) {
        self.pending.cancel_all();
        self.store.reset();
    }
}

async fn resync_or_restore<T: Clone + Keyed>(
    domain: &'static str,
    store: &Store<T>,
    epoch: super::Epoch,
    resync: &Resync<T>,
) {
    match resync().await {
        Ok(items) => {
            store.replace(epoch, items);
        }
        Err(e) => {
            if !e.is_aborted() {
                tracing::error!(domain, error = %e, "Resync failed, restoring last confirmed state");
            }
            store.restore_confirmed(epoch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::notice::Notice;
    use futures_util::future::FutureExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        provisional: bool,
    }

    impl Keyed for Item {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn is_provisional(&self) -> bool {
            self.provisional
        }
    }

    fn coordinator(server: Vec<Item>) -> (Optimistic<Item>, Notifier) {
        let notifier = Notifier::default();
        let resync: Resync<Item> = Arc::new(move || {
            let server = server.clone();
            async move { Ok::<_, SdkError>(server) }.boxed()
        });
        let opt = Optimistic::new("test", Arc::new(Store::new()), notifier.clone(), resync);
        (opt, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_reconciles_with_server() {
        let (opt, _) = coordinator(vec![]);
        opt.apply(
            "add_1",
            |items| {
                items.push(Item { id: 1, provisional: true });
                Ok(())
            },
            || async { Ok(Some(vec![Item { id: 1, provisional: false }])) },
            Duration::from_millis(100),
            OnFailure::Resync,
        )
        .unwrap();

        assert_eq!(opt.store().items()[0].provisional, true);
        opt.pending().settled().await;
        assert_eq!(opt.store().items(), vec![Item { id: 1, provisional: false }]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_discards_and_notifies() {
        let (opt, notifier) = coordinator(vec![]);
        let mut notices = notifier.subscribe();

        opt.apply(
            "add_1",
            |items| {
                items.push(Item { id: 1, provisional: true });
                Ok(())
            },
            || async { Err(SdkError::Http(HttpError::Connectivity("down".into()))) },
            Duration::from_millis(100),
            OnFailure::discard(|items: &mut Vec<Item>| items.retain(|i| i.id != 1)),
        )
        .unwrap();

        opt.pending().settled().await;
        assert!(opt.store().is_empty());
        assert!(matches!(notices.try_recv(), Ok(Notice::Error(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resyncs_from_server() {
        let server = vec![Item { id: 7, provisional: false }];
        let (opt, _) = coordinator(server.clone());

        opt.apply(
            "update_7",
            |items| {
                items.push(Item { id: 8, provisional: false });
                Ok(())
            },
            || async { Err(SdkError::Rejected { message: "Out of stock".into() }) },
            Duration::from_millis(500),
            OnFailure::Resync,
        )
        .unwrap();

        opt.pending().settled().await;
        assert_eq!(opt.store().items(), server);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_is_silent() {
        let (opt, notifier) = coordinator(vec![]);
        let mut notices = notifier.subscribe();

        opt.apply(
            "add_1",
            |items| {
                items.push(Item { id: 1, provisional: true });
                Ok(())
            },
            || async { Err(SdkError::Http(HttpError::Aborted)) },
            Duration::from_millis(100),
            OnFailure::Resync,
        )
        .unwrap();

        opt.pending().settled().await;
        assert!(notices.try_recv().is_err());
        assert_eq!(opt.store().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_local_mutation_schedules_nothing() {
        let (opt, _) = coordinator(vec![]);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), SdkError> = opt.apply(
            "add_1",
            |_| Err(SdkError::QuantityLimit { max: 6 }),
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            },
            Duration::from_millis(100),
            OnFailure::Resync,
        );

        assert!(matches!(result, Err(SdkError::QuantityLimit { max: 6 })));
        assert!(opt.pending().is_empty());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_waits_for_other_keys() {
        let (opt, _) = coordinator(vec![]);
        let add = |id: u32, delay: u64| {
            opt.apply(
                format!("add_{}", id),
                move |items: &mut Vec<Item>| {
                    items.push(Item { id, provisional: true });
                    Ok(())
                },
                move || async move {
                    // The server only knows about item 1 when the first call lands.
                    Ok(Some(vec![Item { id: 1, provisional: false }]
                        .into_iter()
                        .chain((id == 2).then_some(Item { id: 2, provisional: false }))
                        .collect()))
                },
                Duration::from_millis(delay),
                OnFailure::Resync,
            )
            .unwrap()
        };
        add(1, 100);
        add(2, 400);

        tokio::time::sleep(Duration::from_millis(200)).await;
        // Item 2 is still scheduled: item 1's response is held back.
        assert!(opt.store().items().iter().all(|i| i.provisional));

        opt.pending().settled().await;
        assert_eq!(
            opt.store().items(),
            vec![Item { id: 1, provisional: false }, Item { id: 2, provisional: false }]
        );
    }
}
