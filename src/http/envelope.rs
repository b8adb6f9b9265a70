//! The `{success, message, data}` envelope every backend response uses.

use crate::error::SdkError;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The payload of a successful response.
    ///
    /// `success: false` is a rejection even with a 2xx status. A success
    /// without `data` is an error for endpoints that need it.
    pub fn into_data(self) -> Result<T, SdkError> {
        if !self.success {
            return Err(self.rejection());
        }
        self.data
            .ok_or_else(|| SdkError::Other("Response is missing data".to_string()))
    }

    /// Only checks `success`; `data`, if any, is dropped.
    pub fn into_ack(self) -> Result<(), SdkError> {
        if self.success {
            Ok(())
        } else {
            Err(self.rejection())
        }
    }

    fn rejection(&self) -> SdkError {
        SdkError::Rejected {
            message: self
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Request was rejected".to_string()),
        }
    }
}

/// Best-effort `message` from an error body, for non-2xx responses.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<serde::de::IgnoredAny>>(body)
        .ok()
        .and_then(|e| e.message)
}
