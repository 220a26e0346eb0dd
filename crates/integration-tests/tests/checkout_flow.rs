//! Checkout flow integration tests.
//!
//! Drives the five-step checkout the way a browser without JavaScript would:
//! form posts, redirects back to `/checkout`, and 422 re-renders on invalid
//! input.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use medicart_integration_tests::{TestClient, TestResponse};

// =============================================================================
// Helpers
// =============================================================================

const VALID_SHIPPING: &[(&str, &str)] = &[
    ("fullName", "Alex Doe"),
    ("address", "123 Pharmacy Lane"),
    ("city", "Healthville"),
    ("zipCode", "12345"),
    ("shippingMethod", "express"),
];

const VALID_PAYMENT: &[(&str, &str)] = &[
    ("cardholderName", "Alex Doe"),
    ("cardNumber", "4242424242424242"),
    ("expiryDate", "12/29"),
    ("cvc", "123"),
];

fn assert_redirects_to_checkout(response: &TestResponse) {
    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
    assert_eq!(response.location(), Some("/checkout"));
}

/// Walk a fresh session up to the Review step.
async fn client_at_review() -> TestClient {
    let mut client = TestClient::new();
    assert_redirects_to_checkout(&client.post_form("/checkout/shipping", VALID_SHIPPING).await);
    assert_redirects_to_checkout(&client.post_form("/checkout/prescription", &[]).await);
    assert_redirects_to_checkout(&client.post_form("/checkout/payment", VALID_PAYMENT).await);
    client
}

/// Pull the `ORDxxx` reference out of the confirmation page.
fn order_reference(body: &str) -> String {
    let start = body.find("ORD").unwrap();
    body.get(start..start + 6).unwrap().to_string()
}

// =============================================================================
// Step rendering
// =============================================================================

#[tokio::test]
async fn test_new_checkout_starts_at_shipping() {
    let mut client = TestClient::new();
    let response = client.get("/checkout").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Shipping Information"));
    assert!(response.body.contains("Standard Shipping (5-7 days) - $5.00"));
}

#[tokio::test]
async fn test_invalid_shipping_rerenders_with_errors() {
    let mut client = TestClient::new();
    let response = client
        .post_form(
            "/checkout/shipping",
            &[
                ("fullName", "A"),
                ("address", "123 Pharmacy Lane"),
                ("city", "Healthville"),
                ("zipCode", "ABCDE"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Full name must be at least 2 characters."));
    assert!(response.body.contains("Invalid ZIP code."));
    // Entered values are kept
    assert!(response.body.contains("123 Pharmacy Lane"));

    let page = client.get("/checkout").await;
    assert!(page.body.contains("Shipping Information"));
}

#[tokio::test]
async fn test_valid_shipping_moves_to_prescription() {
    let mut client = TestClient::new();
    assert_redirects_to_checkout(&client.post_form("/checkout/shipping", VALID_SHIPPING).await);

    let page = client.get("/checkout").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Prescription Status"));
    assert!(page.body.contains("Atorvastatin 20mg"));
}

#[tokio::test]
async fn test_invalid_payment_does_not_echo_card_number() {
    let mut client = TestClient::new();
    client.post_form("/checkout/shipping", VALID_SHIPPING).await;
    client.post_form("/checkout/prescription", &[]).await;

    let response = client
        .post_form(
            "/checkout/payment",
            &[
                ("cardholderName", "Alex Doe"),
                ("cardNumber", "4242424242424242"),
                ("expiryDate", "13/29"),
                ("cvc", "12"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!response.body.contains("4242424242424242"));
}

#[tokio::test]
async fn test_back_keeps_entered_shipping() {
    let mut client = TestClient::new();
    client.post_form("/checkout/shipping", VALID_SHIPPING).await;

    assert_redirects_to_checkout(&client.post_form("/checkout/back", &[]).await);

    let page = client.get("/checkout").await;
    assert!(page.body.contains("Shipping Information"));
    assert!(page.body.contains("123 Pharmacy Lane"));
}

// =============================================================================
// Disallowed transitions
// =============================================================================

#[tokio::test]
async fn test_back_from_shipping_is_conflict() {
    let mut client = TestClient::new();
    let response = client.post_form("/checkout/back", &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_place_order_before_review_is_conflict() {
    let mut client = TestClient::new();
    let response = client.post_form("/checkout/place-order", &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_skipping_to_payment_is_conflict() {
    let mut client = TestClient::new();
    let response = client.post_form("/checkout/payment", VALID_PAYMENT).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

// =============================================================================
// Placing an order
// =============================================================================

#[tokio::test]
async fn test_review_shows_masked_card_and_total() {
    let mut client = client_at_review().await;
    let page = client.get("/checkout").await;

    assert!(page.body.contains("Review Your Order"));
    assert!(page.body.contains("4242"));
    assert!(!page.body.contains("4242424242424242"));
    // 25.50 + 2 x 12.00 + 15.00 express
    assert!(page.body.contains("$64.50"));
}

#[tokio::test]
async fn test_full_checkout_reaches_confirmation() {
    let mut client = client_at_review().await;

    assert_redirects_to_checkout(&client.post_form("/checkout/place-order", &[]).await);

    let confirmation = client.get("/checkout").await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert!(confirmation.body.contains("Order Placed Successfully!"));
    let reference = order_reference(&confirmation.body);

    // No way back from Confirmation
    let back = client.post_form("/checkout/back", &[]).await;
    assert_eq!(back.status, StatusCode::CONFLICT);

    let finish = client.post_form("/checkout/finish", &[]).await;
    assert_eq!(finish.status, StatusCode::SEE_OTHER);
    assert_eq!(finish.location(), Some("/user-dashboard"));

    let dashboard = client.get("/user-dashboard").await;
    assert!(dashboard.body.contains(&reference));
    assert!(dashboard.body.contains("Pending Verification"));

    // Cart was emptied, so a second order is refused
    client.post_form("/checkout/shipping", VALID_SHIPPING).await;
    client.post_form("/checkout/prescription", &[]).await;
    client.post_form("/checkout/payment", VALID_PAYMENT).await;
    let again = client.post_form("/checkout/place-order", &[]).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_place_order_off_review_with_empty_cart_is_conflict() {
    let mut client = client_at_review().await;
    client.post_form("/checkout/place-order", &[]).await;
    client.post_form("/checkout/finish", &[]).await;

    // Back at Shipping with an emptied cart
    let response = client.post_form("/checkout/place-order", &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_back_control_only_where_retreat_is_allowed() {
    let mut client = TestClient::new();
    let shipping = client.get("/checkout").await;
    assert!(!shipping.body.contains("action=\"/checkout/back\""));

    client.post_form("/checkout/shipping", VALID_SHIPPING).await;
    let prescription = client.get("/checkout").await;
    assert!(prescription.body.contains("Back to Shipping"));

    client.post_form("/checkout/prescription", &[]).await;
    client.post_form("/checkout/payment", VALID_PAYMENT).await;
    let review = client.get("/checkout").await;
    assert!(review.body.contains("Back to Payment"));

    client.post_form("/checkout/place-order", &[]).await;
    let confirmation = client.get("/checkout").await;
    assert!(!confirmation.body.contains("action=\"/checkout/back\""));
}

// =============================================================================
// Live validation endpoint
// =============================================================================

#[tokio::test]
async fn test_validate_endpoint_reports_field_errors() {
    let mut client = TestClient::new();
    let response = client
        .post_json(
            "/checkout/validate/shipping",
            &serde_json::json!({
                "fullName": "Alex Doe",
                "address": "12",
                "city": "Healthville",
                "zipCode": "12345-678",
                "shippingMethod": "standard",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    assert_eq!(json["valid"], false);
    assert_eq!(json["errors"]["zipCode"], "Invalid ZIP code.");
    assert!(json["errors"].get("address").is_some());
    assert!(json["errors"].get("fullName").is_none());
}

#[tokio::test]
async fn test_validate_endpoint_accepts_valid_payment() {
    let mut client = TestClient::new();
    let response = client
        .post_json(
            "/checkout/validate/payment",
            &serde_json::json!({
                "cardholderName": "Alex Doe",
                "cardNumber": "4242424242424242",
                "expiryDate": "01/30",
                "cvc": "1234",
            }),
        )
        .await;

    let json = response.json();
    assert_eq!(json["valid"], true);
    assert_eq!(json["errors"], serde_json::json!({}));
}

#[tokio::test]
async fn test_validate_unknown_schema_is_not_found() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/checkout/validate/billing", &serde_json::json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
