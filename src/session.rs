//! Session: the identity handed over by the external auth provider.
//!
//! ## Security Model
//!
//! The bearer token is stored inside the HTTP layer and injected as an
//! `Authorization: Bearer <token>` header. It is never exposed through the
//! public API; `Session` only keeps it long enough to hand it over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session issued by the identity provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub(crate) token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            expires_at: None,
            token: token.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the session is still valid (no expiry, or not yet expired).
    pub fn is_active(&self) -> bool {
        self.expires_at.map(|t| Utc::now() < t).unwrap_or(true)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
