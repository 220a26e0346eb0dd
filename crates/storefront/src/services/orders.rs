//! Order placement.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use medicart_core::checkout::CheckoutPayload;
use medicart_core::{OrderId, OrderStatus, Price};

use crate::models::OrderSummary;

/// Errors from an order service.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("order service unavailable: {0}")]
    Unavailable(String),
}

/// An order accepted by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub status: OrderStatus,
    pub placed_on: NaiveDate,
    pub total: Price,
}

impl From<&PlacedOrder> for OrderSummary {
    fn from(order: &PlacedOrder) -> Self {
        Self {
            id: order.id.clone(),
            placed_on: order.placed_on,
            total: order.total,
            status: order.status,
        }
    }
}

/// Accepts completed checkouts.
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Place an order for a completed checkout.
    ///
    /// # Errors
    ///
    /// Returns `OrderServiceError` if the order cannot be accepted.
    async fn place_order(&self, payload: &CheckoutPayload) -> Result<PlacedOrder, OrderServiceError>;
}

/// In-process order service that accepts every non-empty order.
#[derive(Debug, Clone, Default)]
pub struct SimulatedOrderService;

#[async_trait::async_trait]
impl OrderService for SimulatedOrderService {
    async fn place_order(&self, payload: &CheckoutPayload) -> Result<PlacedOrder, OrderServiceError> {
        if payload.cart.is_empty() {
            return Err(OrderServiceError::EmptyCart);
        }

        let id = OrderId::new(format!("ORD{:03}", rand::rng().random_range(0..1000)));
        let status = initial_status(payload);

        tracing::info!(
            order_id = %id,
            status = %status,
            total = %payload.total,
            "Order placed"
        );

        Ok(PlacedOrder {
            id,
            status,
            placed_on: Utc::now().date_naive(),
            total: payload.total,
        })
    }
}

/// Orders holding prescription items wait for a pharmacist.
#[must_use]
pub fn initial_status(payload: &CheckoutPayload) -> OrderStatus {
    if payload.cart.requires_prescription() {
        OrderStatus::PendingVerification
    } else {
        OrderStatus::Processing
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use medicart_core::checkout::CheckoutFlow;
    use medicart_core::validation::{PaymentForm, ShippingForm};
    use medicart_core::{Cart, CurrencyCode, Product, ProductId};

    use super::*;

    fn product(rx: bool) -> Product {
        Product {
            id: ProductId::new("p"),
            name: "Test".to_string(),
            brand: "GenericMed".to_string(),
            category: "Test".to_string(),
            price: Price::from_cents(1000, CurrencyCode::USD),
            image_url: String::new(),
            requires_prescription: rx,
            description: String::new(),
            images: Vec::new(),
            details: None,
        }
    }

    fn payload(cart: &Cart) -> CheckoutPayload {
        let mut flow = CheckoutFlow::new();
        flow.submit_shipping(&ShippingForm {
            full_name: "Alex Doe".to_string(),
            address: "123 Pharmacy Lane".to_string(),
            city: "Healthville".to_string(),
            zip_code: "12345".to_string(),
            shipping_method: Some("standard".to_string()),
        })
        .unwrap();
        flow.advance().unwrap();
        flow.submit_payment(&PaymentForm {
            cardholder_name: "Alex Doe".to_string(),
            card_number: "4242424242424242".to_string(),
            expiry_date: "12/30".to_string(),
            cvc: "123".to_string(),
        })
        .unwrap();
        flow.payload(cart).unwrap()
    }

    #[tokio::test]
    async fn test_prescription_order_starts_pending_verification() {
        let mut cart = Cart::default();
        cart.add_item(&product(true), None);
        let order = SimulatedOrderService.place_order(&payload(&cart)).await.unwrap();

        assert_eq!(order.status, OrderStatus::PendingVerification);
        assert!(order.id.as_str().starts_with("ORD"));
        assert_eq!(order.id.as_str().len(), 6);
        assert_eq!(order.total.display(), "$15.00");
    }

    #[tokio::test]
    async fn test_otc_order_starts_processing() {
        let mut cart = Cart::default();
        cart.add_item(&product(false), None);
        let order = SimulatedOrderService.place_order(&payload(&cart)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let result = SimulatedOrderService.place_order(&payload(&Cart::default())).await;
        assert!(matches!(result, Err(OrderServiceError::EmptyCart)));
    }
}
