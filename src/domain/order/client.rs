//! Orders sub-client.

use tokio::sync::watch;

use crate::api::StorefrontApi;
use crate::client::StorefrontClient;
use crate::domain::order::wire::{CreateOrderRequest, VerifyPaymentRequest};
use crate::domain::order::{GatewayOrder, Order, PaymentConfirmation, PaymentMethod, PlaceOrder};
use crate::error::SdkError;
use crate::sync::Snapshot;

/// Sub-client for orders. Orders are read-only once placed.
pub struct Orders<'a, A: StorefrontApi> {
    pub(crate) client: &'a StorefrontClient<A>,
}

impl<'a, A: StorefrontApi> Orders<'a, A> {
    pub fn list(&self) -> Vec<Order> {
        self.client.orders.items()
    }

    /// An order already in the local list.
    pub fn find(&self, id: &str) -> Option<Order> {
        self.client
            .orders
            .read(|orders| orders.iter().find(|o| o.id == id).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Order>> {
        self.client.orders.subscribe()
    }

    /// Refetch the order history. A no-op without a session.
    pub async fn refresh(&self) -> Result<(), SdkError> {
        if !self.client.is_signed_in().await {
            return Ok(());
        }
        let store = &self.client.orders;
        let ticket = store.begin_fetch();
        match self.client.api.fetch_orders().await {
            Ok(orders) => {
                store.finish_fetch(ticket, Some(orders));
                Ok(())
            }
            Err(e) => {
                store.finish_fetch(ticket, None);
                Err(e)
            }
        }
    }

    /// Refetch and return the order history.
    pub async fn fetch(&self) -> Result<Vec<Order>, SdkError> {
        self.refresh().await?;
        Ok(self.list())
    }

    /// Order detail, straight from the server.
    pub async fn get(&self, id: &str) -> Result<Order, SdkError> {
        self.client.require_session().await?;
        self.client.api.fetch_order(id).await
    }

    /// Place a cash-on-delivery order.
    ///
    /// On success the cart is emptied and the order history refetched.
    pub async fn place(&self, order: &PlaceOrder) -> Result<Order, SdkError> {
        self.client.require_session().await?;
        order.validate()?;
        if order.payment_method != PaymentMethod::Cod {
            return Err(SdkError::Other(
                "Online orders go through begin_payment".to_string(),
            ));
        }

        let request = CreateOrderRequest::from(order);
        match self.client.api.create_order(&request).await {
            Ok(placed) => {
                tracing::debug!(order_id = %placed.id, total = %placed.totals.total, "Order placed");
                self.after_purchase().await;
                self.client.notifier.success("Order placed");
                Ok(placed)
            }
            Err(e) => Err(self.surface("place", e)),
        }
    }

    /// Open a gateway order for online payment. Nothing changes locally
    /// until [`confirm_payment`](Self::confirm_payment) succeeds.
    pub async fn begin_payment(&self, order: &PlaceOrder) -> Result<GatewayOrder, SdkError> {
        self.client.require_session().await?;
        order.validate()?;

        let request = CreateOrderRequest::from(order);
        self.client
            .api
            .create_payment_order(&request)
            .await
            .map_err(|e| self.surface("begin_payment", e))
    }

    /// Verify the gateway's callback with the backend, which then records
    /// the order. Clears the cart and resyncs orders on success.
    pub async fn confirm_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<Order, SdkError> {
        self.client.require_session().await?;

        let request = VerifyPaymentRequest::from(confirmation);
        match self.client.api.verify_payment(&request).await {
            Ok(placed) => {
                tracing::debug!(
                    order_id = %placed.id,
                    gateway_order_id = %confirmation.gateway_order_id,
                    "Payment verified"
                );
                self.after_purchase().await;
                self.client.notifier.success("Payment successful, order placed");
                Ok(placed)
            }
            Err(e) => Err(self.surface("confirm_payment", e)),
        }
    }

    /// The server empties the cart when it records an order; mirror that
    /// locally, then pick up the authoritative state.
    async fn after_purchase(&self) {
        let cart = self.client.cart();
        cart.clear_local().await;
        let (cart_result, orders_result) = futures_util::join!(cart.refresh(), self.refresh());
        if let Err(e) = cart_result {
            tracing::warn!(error = %e, "Cart resync after purchase failed");
        }
        if let Err(e) = orders_result {
            tracing::warn!(error = %e, "Order resync after purchase failed");
        }
    }

    fn surface(&self, action: &'static str, e: SdkError) -> SdkError {
        if !e.is_aborted() {
            tracing::warn!(action, error = %e, "Order call failed");
            self.client.notifier.error(e.user_message());
        }
        e
    }
}
