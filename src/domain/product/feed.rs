//! `ProductFeed`: a product listing whose latest request always wins.
//!
//! A listing view issues a new fetch every time the user changes a filter.
//! Each `load` bumps a generation counter and cancels the previous request;
//! a response is applied only if its generation is still the newest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::StorefrontApi;
use crate::domain::product::{ProductPage, ProductQuery};
use crate::error::SdkError;
use crate::sync::abortable;

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub page: Option<ProductPage>,
    pub query: Option<ProductQuery>,
    pub loading: bool,
    /// Message of the last failed load, cleared by the next success.
    pub error: Option<String>,
}

pub struct ProductFeed<A: StorefrontApi> {
    api: Arc<A>,
    tx: watch::Sender<FeedState>,
    generation: AtomicU64,
    current: Mutex<CancellationToken>,
}

impl<A: StorefrontApi> ProductFeed<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (tx, _) = watch::channel(FeedState::default());
        Self {
            api,
            tx,
            generation: AtomicU64::new(0),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn state(&self) -> FeedState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.tx.subscribe()
    }

    /// Fetch `query`, superseding any load still in flight.
    ///
    /// Returns `Ok(true)` if the result was applied, `Ok(false)` if a newer
    /// load superseded this one.
    pub async fn load(&self, query: ProductQuery) -> Result<bool, SdkError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = {
            let mut current = self.lock_current();
            current.cancel();
            *current = CancellationToken::new();
            current.clone()
        };
        self.tx.send_modify(|s| {
            s.loading = true;
            s.query = Some(query.clone());
        });

        let result = abortable(&token, self.api.list_products(&query)).await;

        if generation != self.generation.load(Ordering::SeqCst) {
            tracing::debug!(generation, "Discarding superseded product page");
            return Ok(false);
        }
        match result {
            Ok(page) => {
                self.tx.send_modify(|s| {
                    s.page = Some(page);
                    s.loading = false;
                    s.error = None;
                });
                Ok(true)
            }
            Err(e) if e.is_aborted() => Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "Product listing failed");
                self.tx.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.user_message());
                });
                Err(e)
            }
        }
    }

    /// Abandon the load in flight, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.lock_current().cancel();
        self.tx.send_modify(|s| s.loading = false);
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<A: StorefrontApi> std::fmt::Debug for ProductFeed<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductFeed")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("state", &*self.tx.borrow())
            .finish()
    }
}
