//! Session-backed cart.
//!
//! The cart lives in the session under [`keys::CART`]. A session that has
//! never held a cart starts from [`Catalog::seed_cart`]; an emptied cart
//! stays empty.

use tower_sessions::Session;

use medicart_core::{Cart, CartItem, PrescriptionRef, Product};

use crate::models::session::keys;
use crate::services::catalog::Catalog;

/// Load the shopper's cart, seeding it on first access.
///
/// # Errors
///
/// Returns the session error if the session store fails.
pub async fn load_cart(
    session: &Session,
    catalog: &dyn Catalog,
) -> Result<Cart, tower_sessions::session::Error> {
    if let Some(cart) = session.get::<Cart>(keys::CART).await? {
        return Ok(cart);
    }
    let cart = catalog.seed_cart().await;
    save_cart(session, &cart).await?;
    Ok(cart)
}

/// Persist the cart in the session.
///
/// # Errors
///
/// Returns the session error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Add one unit of `product`, optionally attaching a prescription.
///
/// # Errors
///
/// Returns the session error if the session store fails.
pub async fn add_item(
    session: &Session,
    catalog: &dyn Catalog,
    product: &Product,
    prescription: Option<PrescriptionRef>,
) -> Result<CartItem, tower_sessions::session::Error> {
    let mut cart = load_cart(session, catalog).await?;
    let line = cart.add_item(product, prescription).clone();
    save_cart(session, &cart).await?;

    tracing::info!(
        product_id = %line.product_id,
        quantity = line.quantity,
        prescription = line.prescription.is_some(),
        "Added to cart"
    );
    Ok(line)
}
