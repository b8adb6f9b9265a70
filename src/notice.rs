//! User-facing transient notices (toasts).
//!
//! Background sync tasks cannot return errors to the caller that started
//! them, so every outcome worth showing is broadcast here instead. The app
//! subscribes once and renders whatever arrives.

use std::sync::Arc;
use tokio::sync::broadcast;

const NOTICE_CAPACITY: usize = 64;

/// A transient notice for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
    /// A mutating action was attempted without a session.
    SignInRequired,
}

/// Callback that opens the identity provider's sign-in flow.
pub type SignInPrompt = Arc<dyn Fn() + Send + Sync>;

/// Broadcasts notices to every subscriber.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
    sign_in: Option<SignInPrompt>,
}

impl Notifier {
    pub fn new(sign_in: Option<SignInPrompt>) -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { tx, sign_in }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn emit(&self, notice: Notice) {
        // No subscribers is fine: nobody is rendering notices.
        let _ = self.tx.send(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Notice::Success(message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notice::Error(message.into()));
    }

    /// Emit `SignInRequired` and invoke the sign-in callback, if any.
    pub fn prompt_sign_in(&self) {
        self.emit(Notice::SignInRequired);
        if let Some(prompt) = &self.sign_in {
            prompt();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.tx.receiver_count())
            .field("sign_in", &self.sign_in.is_some())
            .finish()
    }
}
