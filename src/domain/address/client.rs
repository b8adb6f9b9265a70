//! Addresses sub-client: direct calls, each followed by a full resync.

use std::future::Future;

use tokio::sync::watch;

use crate::api::StorefrontApi;
use crate::client::StorefrontClient;
use crate::domain::address::wire::AddressRequest;
use crate::domain::address::{state, Address, AddressDraft};
use crate::error::SdkError;
use crate::sync::Snapshot;

/// Sub-client for saved addresses.
///
/// Unlike the cart, address changes are not optimistic: each call goes
/// straight to the backend and the list is refetched afterwards.
pub struct Addresses<'a, A: StorefrontApi> {
    pub(crate) client: &'a StorefrontClient<A>,
}

impl<'a, A: StorefrontApi> Addresses<'a, A> {
    pub fn list(&self) -> Vec<Address> {
        self.client.addresses.items()
    }

    pub fn get(&self, id: &str) -> Option<Address> {
        self.client
            .addresses
            .read(|addresses| state::find(addresses, id).cloned())
    }

    /// The address flagged default, else the first one.
    pub fn default_address(&self) -> Option<Address> {
        self.client
            .addresses
            .read(|addresses| state::default_address(addresses).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Address>> {
        self.client.addresses.subscribe()
    }

    /// Refetch the list. A no-op without a session.
    pub async fn refresh(&self) -> Result<(), SdkError> {
        if !self.client.is_signed_in().await {
            return Ok(());
        }
        let store = &self.client.addresses;
        let ticket = store.begin_fetch();
        match self.client.api.fetch_addresses().await {
            Ok(addresses) => {
                store.finish_fetch(ticket, Some(addresses));
                Ok(())
            }
            Err(e) => {
                store.finish_fetch(ticket, None);
                Err(e)
            }
        }
    }

    /// Save a new address. The draft is validated first; nothing is sent
    /// if any field fails.
    pub async fn add(&self, draft: &AddressDraft) -> Result<Address, SdkError> {
        self.client.require_session().await?;
        draft.validate()?;

        let request = AddressRequest::from(draft);
        self.direct("add", "Address saved", self.client.api.create_address(&request))
            .await
    }

    pub async fn update(&self, id: &str, draft: &AddressDraft) -> Result<Address, SdkError> {
        self.client.require_session().await?;
        draft.validate()?;

        let request = AddressRequest::from(draft);
        self.direct(
            "update",
            "Address updated",
            self.client.api.update_address(id, &request),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), SdkError> {
        self.client.require_session().await?;
        self.direct("delete", "Address removed", self.client.api.delete_address(id))
            .await
    }

    pub async fn set_default(&self, id: &str) -> Result<(), SdkError> {
        self.client.require_session().await?;
        self.direct(
            "set_default",
            "Default address updated",
            self.client.api.set_default_address(id),
        )
        .await
    }

    /// Run `call`, then resync the list. Failures are logged and shown as
    /// a notice before being returned.
    async fn direct<R>(
        &self,
        action: &'static str,
        success: &str,
        call: impl Future<Output = Result<R, SdkError>>,
    ) -> Result<R, SdkError> {
        match call.await {
            Ok(out) => {
                if let Err(e) = self.refresh().await {
                    tracing::warn!(action, error = %e, "Address resync failed");
                }
                self.client.notifier.success(success);
                Ok(out)
            }
            Err(e) => {
                if !e.is_aborted() {
                    tracing::warn!(action, error = %e, "Address change failed");
                    self.client.notifier.error(e.user_message());
                }
                Err(e)
            }
        }
    }
}
