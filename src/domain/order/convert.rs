//! Conversions: order wire types ↔ domain types.

use super::wire::{
    CreateOrderRequest, GatewayOrderResponse, OrderItemRequest, OrderItemWire, OrderResponse,
    OrdersResponse, VerifyPaymentRequest,
};
use super::{GatewayOrder, Order, OrderItem, OrderTotals, PaymentConfirmation, PlaceOrder};
use crate::domain::address::wire::AddressRequest;
use crate::domain::address::Address;

impl From<OrderItemWire> for OrderItem {
    fn from(i: OrderItemWire) -> Self {
        OrderItem {
            product_id: i.product_id,
            name: i.name,
            image: i.image,
            quantity: i.quantity,
            price: i.price,
            size: i.size,
            color: i.color,
        }
    }
}

impl From<OrderResponse> for Order {
    fn from(o: OrderResponse) -> Self {
        Order {
            id: o.id,
            order_number: o.order_number,
            address: Address::from(o.shipping_address),
            items: o.items.into_iter().map(OrderItem::from).collect(),
            totals: OrderTotals {
                subtotal: o.subtotal,
                shipping: o.shipping,
                tax: o.tax,
                total: o.total,
            },
            status: o.status,
            payment_method: o.payment_method,
            payment_id: o.payment_id,
            created_at: o.created_at,
        }
    }
}

impl From<OrdersResponse> for Vec<Order> {
    fn from(resp: OrdersResponse) -> Self {
        resp.orders.into_iter().map(Order::from).collect()
    }
}

impl From<&PlaceOrder> for CreateOrderRequest {
    fn from(p: &PlaceOrder) -> Self {
        CreateOrderRequest {
            address_id: Some(p.address.id.clone()).filter(|id| !id.is_empty()),
            shipping_address: AddressRequest::from(&p.address),
            items: p
                .items
                .iter()
                .map(|i| OrderItemRequest {
                    product_id: i.product_id.clone(),
                    name: i.name.clone(),
                    quantity: i.quantity,
                    price: i.price,
                    size: i.size.clone(),
                    color: i.color.clone(),
                })
                .collect(),
            payment_method: p.payment_method,
        }
    }
}

impl From<GatewayOrderResponse> for GatewayOrder {
    fn from(g: GatewayOrderResponse) -> Self {
        GatewayOrder {
            gateway_order_id: g.order_id,
            amount: g.amount,
            currency: g.currency,
            key_id: g.key_id,
        }
    }
}

impl From<&PaymentConfirmation> for VerifyPaymentRequest {
    fn from(c: &PaymentConfirmation) -> Self {
        VerifyPaymentRequest {
            gateway_order_id: c.gateway_order_id.clone(),
            payment_id: c.payment_id.clone(),
            signature: c.signature.clone(),
        }
    }
}
