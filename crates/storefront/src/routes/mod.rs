//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Home page
//! GET  /health                             - Health check
//!
//! # Products
//! GET  /product-listing                    - Listing (?brand=&rx=1&sort=&page=)
//! GET  /product-detail                     - Featured product
//! GET  /product-detail/{id}                - Product detail (?upload=1 opens the dialog)
//! POST /product-detail/{id}/prescription   - Prescription upload (multipart)
//!
//! # Cart
//! POST /cart/add                           - Add to cart, redirect back
//!
//! # Checkout
//! GET  /checkout                           - Current step
//! POST /checkout/shipping                  - Submit shipping form
//! POST /checkout/prescription              - Continue past prescription review
//! POST /checkout/payment                   - Submit payment form
//! POST /checkout/back                      - Previous step
//! POST /checkout/place-order               - Review -> Confirmation
//! POST /checkout/finish                    - Confirmation -> dashboard
//! POST /checkout/validate/{schema}         - Live field validation (JSON)
//!
//! # Account
//! GET  /user-dashboard                     - Orders, profile, address (?tab=)
//!
//! # Pages
//! GET  /about /contact /careers /terms-of-service /privacy-policy /disclaimer
//! ```

pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
///
/// The upload route carries its own body limit.
pub fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(products::featured))
        .route("/{id}", get(products::show))
        .route(
            "/{id}/prescription",
            post(products::upload_prescription).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/add", post(cart::add))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/prescription", post(checkout::submit_prescription))
        .route("/payment", post(checkout::submit_payment))
        .route("/back", post(checkout::back))
        .route("/place-order", post(checkout::place_order))
        .route("/finish", post(checkout::finish))
        .route("/validate/{schema}", post(checkout::validate_fields))
}

/// Create all routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/product-listing", get(products::index))
        .nest("/product-detail", product_routes(max_upload_bytes))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/user-dashboard", get(dashboard::index))
        .merge(pages::router())
}
