//! Cart route handlers.
//!
//! The cart itself lives in the session (see [`crate::services::cart`]).
//! Checkout renders it through [`CartView`].

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use medicart_core::{Cart, CartItem, Notice, ProductId, ShippingMethod};

use crate::error::{AppError, Result};
use crate::models::set_notice;
use crate::services::cart;
use crate::state::AppState;

/// Where `/cart/add` goes back to when the form gives no usable target.
const DEFAULT_REDIRECT: &str = "/product-listing";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub requires_prescription: bool,
    pub has_prescription: bool,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.unit_price.display(),
            line_price: item.line_total().display(),
            requires_prescription: item.requires_prescription,
            has_prescription: item.prescription.is_some(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping_label: String,
    pub shipping: String,
    pub total: String,
    pub item_count: u32,
    pub missing_prescriptions: Vec<String>,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, shipping: ShippingMethod) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal().display(),
            shipping_label: shipping.label(),
            shipping: shipping.cost().display(),
            total: cart.total(shipping).display(),
            item_count: cart.item_count(),
            missing_prescriptions: cart.missing_prescriptions().map(|i| i.name.clone()).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Form data for adding to cart.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Only same-site absolute paths are followed.
fn safe_redirect(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => DEFAULT_REDIRECT,
    }
}

/// Add one unit of a product to the cart and go back with a notice.
///
/// # Errors
///
/// Returns 404 for unknown products and 500 if the session store fails.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .get_product(&ProductId::new(form.product_id.as_str()))
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    cart::add_item(&session, state.catalog(), &product, None).await?;
    set_notice(
        &session,
        &Notice::success(
            "Added to Cart",
            format!("{} has been added to your cart.", product.name),
        ),
    )
    .await?;

    Ok(Redirect::to(safe_redirect(form.redirect_to.as_deref())))
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use medicart_core::{CurrencyCode, Price, Product};

    use super::*;

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/product-detail/3")), "/product-detail/3");
        assert_eq!(safe_redirect(Some("//evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("https://evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(None), DEFAULT_REDIRECT);
    }

    #[test]
    fn test_cart_view_totals() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Amoxicillin".to_string(),
            brand: "GenericMed".to_string(),
            category: "Antibiotics".to_string(),
            price: Price::from_cents(2599, CurrencyCode::USD),
            image_url: String::new(),
            requires_prescription: true,
            description: String::new(),
            images: Vec::new(),
            details: None,
        };
        let mut cart = Cart::default();
        cart.add_item(&product, None);
        cart.add_item(&product, None);

        let view = CartView::new(&cart, ShippingMethod::Standard);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$51.98");
        assert_eq!(view.missing_prescriptions, vec!["Amoxicillin"]);
        assert_eq!(view.items[0].line_price, "$51.98");
    }
}
