//! Client-side state synchronization.
//!
//! - `store`: the reactive container each domain keeps its records in
//! - `pending`: key-indexed table of debounced backend calls
//! - `optimistic`: apply locally now, sync later, roll back on failure

pub mod optimistic;
pub mod pending;
pub mod store;

pub use optimistic::{OnFailure, Optimistic};
pub use pending::{InFlight, PendingMutations};
pub use store::{Epoch, FetchTicket, Snapshot, Store};

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{HttpError, SdkError};

/// A record with a stable logical identity.
pub trait Keyed {
    type Key: PartialEq;

    /// Logical identity used to match local records against server records.
    fn key(&self) -> Self::Key;

    /// Whether the record was created optimistically and the server has not
    /// confirmed it yet.
    fn is_provisional(&self) -> bool;
}

/// Debounce windows per operation type.
///
/// Adds fire quickly to keep perceived latency low; quantity updates wait
/// longer to absorb rapid increment/decrement clicks.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub add_debounce: Duration,
    pub remove_debounce: Duration,
    pub update_debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            add_debounce: Duration::from_millis(100),
            remove_debounce: Duration::from_millis(200),
            update_debounce: Duration::from_millis(500),
        }
    }
}

/// Run `fut` until it completes or `token` is cancelled, whichever comes
/// first. Cancellation drops the future and yields `HttpError::Aborted`.
pub async fn abortable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T, SdkError>>,
) -> Result<T, SdkError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(HttpError::Aborted.into()),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_abortable_yields_aborted_on_cancel() {
        let token = CancellationToken::new();
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, SdkError>(1)
        };
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cancel.cancel();
        });
        let err = abortable(&token, slow).await.unwrap_err();
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_abortable_passes_result_through() {
        let token = CancellationToken::new();
        let out = abortable(&token, async { Ok::<_, SdkError>("done") }).await;
        assert_eq!(out.unwrap(), "done");
    }
}
