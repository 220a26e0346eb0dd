//! Checkout route handlers.
//!
//! The flow lives in the session under [`keys::CHECKOUT`] and is driven by
//! [`CheckoutFlow`]. Every POST follows post/redirect/get: a successful move
//! saves the flow and redirects to `GET /checkout`, an invalid form re-renders
//! the current step with per-field messages (422), and a move the flow does
//! not allow is a 409.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use medicart_core::{
    CheckoutAction, CheckoutError, CheckoutFlow, CheckoutStep, FieldErrors, Notice,
    Schema, ShippingMethod, TransitionError, Validation, validate,
};
use medicart_core::validation::{PaymentForm, ShippingForm};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session::keys;
use crate::models::take_notice;
use crate::routes::cart::CartView;
use crate::services::{PlacedOrder, cart};
use crate::state::AppState;

const CHECKOUT_PATH: &str = "/checkout";
const DASHBOARD_PATH: &str = "/user-dashboard";

// =============================================================================
// Session helpers
// =============================================================================

async fn load_flow(session: &Session) -> Result<CheckoutFlow> {
    Ok(session
        .get::<CheckoutFlow>(keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

async fn save_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session.insert(keys::CHECKOUT, flow).await?;
    Ok(())
}

// =============================================================================
// View Types
// =============================================================================

/// A step on the progress indicator.
#[derive(Clone)]
pub struct StepView {
    pub number: u8,
    pub title: &'static str,
    pub css_class: &'static str,
    pub completed: bool,
    pub active: bool,
}

/// A shipping method radio button.
#[derive(Clone)]
pub struct ShippingOptionView {
    pub value: &'static str,
    pub label: String,
    pub checked: bool,
}

/// Details echoed back on the Review step.
#[derive(Clone)]
pub struct ReviewView {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub shipping_method: String,
    pub cardholder_name: String,
    pub masked_card_number: String,
    pub expiry_date: String,
}

/// The order shown on the Confirmation step.
#[derive(Clone)]
pub struct PlacedOrderView {
    pub id: String,
    pub status: &'static str,
    pub total: String,
}

impl From<&PlacedOrder> for PlacedOrderView {
    fn from(order: &PlacedOrder) -> Self {
        Self {
            id: order.id.to_string(),
            status: order.status.label(),
            total: order.total.display(),
        }
    }
}

/// Form values and messages for the step being rendered.
#[derive(Default)]
struct StepForms {
    shipping: Option<ShippingForm>,
    payment: Option<PaymentForm>,
    errors: FieldErrors,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckoutTemplate {
    pub notice: Option<Notice>,
    pub step_number: u8,
    pub is_shipping: bool,
    pub is_prescription: bool,
    pub is_payment: bool,
    pub is_review: bool,
    pub is_confirmation: bool,
    pub stepper: Vec<StepView>,
    /// Label of the back control, absent where going back is not allowed.
    pub back_label: Option<String>,
    pub shipping: ShippingForm,
    pub shipping_options: Vec<ShippingOptionView>,
    pub payment: PaymentForm,
    pub errors: FieldErrors,
    pub cart: CartView,
    pub review: Option<ReviewView>,
    pub order: Option<PlacedOrderView>,
}

impl CheckoutTemplate {
    /// Message for `field`, empty when it passed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> &str {
        self.errors.message(field)
    }

    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains(field)
    }
}

fn back_label(step: CheckoutStep) -> Option<String> {
    if !step.can_retreat() {
        return None;
    }
    step.transition(CheckoutAction::Retreat)
        .map(|previous| format!("Back to {}", previous.title()))
}

fn stepper(flow: &CheckoutFlow) -> Vec<StepView> {
    flow.progress()
        .into_iter()
        .map(|p| StepView {
            number: p.step.number(),
            title: p.step.title(),
            css_class: p.state.css_class(),
            completed: p.state == medicart_core::StepState::Completed,
            active: p.state == medicart_core::StepState::Active,
        })
        .collect()
}

fn review(flow: &CheckoutFlow) -> Option<ReviewView> {
    let shipping = flow.shipping()?;
    let payment = flow.payment()?;
    Some(ReviewView {
        full_name: shipping.full_name.clone(),
        address: shipping.address.clone(),
        city: shipping.city.clone(),
        zip_code: shipping.zip_code.clone(),
        shipping_method: shipping.shipping_method.label(),
        cardholder_name: payment.cardholder_name.clone(),
        masked_card_number: payment.masked_card_number(),
        expiry_date: payment.expiry_date.clone(),
    })
}

async fn render(
    state: &AppState,
    session: &Session,
    flow: &CheckoutFlow,
    forms: StepForms,
) -> Result<CheckoutTemplate> {
    let cart = cart::load_cart(session, state.catalog()).await?;
    let step = flow.current_step();

    let shipping = forms.shipping.unwrap_or_else(|| {
        flow.shipping().map_or_else(
            || ShippingForm {
                shipping_method: Some(ShippingMethod::default().as_str().to_string()),
                ..ShippingForm::default()
            },
            ShippingForm::from,
        )
    });
    // Card number and CVC are never echoed back.
    let payment = forms.payment.unwrap_or_else(|| {
        flow.payment().map_or_else(PaymentForm::default, |p| PaymentForm {
            cardholder_name: p.cardholder_name.clone(),
            expiry_date: p.expiry_date.clone(),
            ..PaymentForm::default()
        })
    });
    let shipping_options = ShippingMethod::ALL
        .into_iter()
        .map(|method| ShippingOptionView {
            value: method.as_str(),
            label: method.label(),
            checked: shipping.shipping_method.as_deref() == Some(method.as_str()),
        })
        .collect();

    let order = if step.is_terminal() {
        session
            .get::<PlacedOrder>(keys::LAST_ORDER)
            .await?
            .as_ref()
            .map(PlacedOrderView::from)
    } else {
        None
    };

    Ok(CheckoutTemplate {
        notice: take_notice(session).await,
        step_number: step.number(),
        is_shipping: step == CheckoutStep::Shipping,
        is_prescription: step == CheckoutStep::Prescription,
        is_payment: step == CheckoutStep::Payment,
        is_review: step == CheckoutStep::Review,
        is_confirmation: step == CheckoutStep::Confirmation,
        stepper: stepper(flow),
        back_label: back_label(step),
        shipping,
        shipping_options,
        payment,
        errors: forms.errors,
        cart: CartView::new(&cart, flow.shipping_method()),
        review: review(flow),
        order,
    })
}

async fn rerender_invalid(
    state: &AppState,
    session: &Session,
    flow: &CheckoutFlow,
    forms: StepForms,
) -> Result<Response> {
    let page = render(state, session, flow, forms).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the current checkout step.
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let flow = load_flow(&session).await?;
    render(&state, &session, &flow, StepForms::default()).await
}

/// Validate the shipping form and move on to Prescription.
///
/// # Errors
///
/// Returns 409 off the Shipping step and 500 if the session store fails.
#[instrument(skip(state, session, form))]
pub async fn submit_shipping(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    match flow.submit_shipping(&form) {
        Ok(step) => {
            save_flow(&session, &flow).await?;
            tracing::info!(step = %step, "Shipping details accepted");
            Ok(Redirect::to(CHECKOUT_PATH).into_response())
        }
        Err(CheckoutError::Invalid(errors)) => {
            tracing::debug!(fields = errors.len(), "Shipping form rejected");
            let forms = StepForms {
                shipping: Some(form),
                errors,
                ..StepForms::default()
            };
            rerender_invalid(&state, &session, &flow, forms).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Continue past the Prescription step.
///
/// # Errors
///
/// Returns 409 off the Prescription step and 500 if the session store fails.
#[instrument(skip(session))]
pub async fn submit_prescription(session: Session) -> Result<Redirect> {
    let mut flow = load_flow(&session).await?;
    if flow.current_step() != CheckoutStep::Prescription {
        return Err(TransitionError {
            from: flow.current_step(),
            action: CheckoutAction::Advance,
        }
        .into());
    }
    let step = flow.advance()?;
    save_flow(&session, &flow).await?;
    tracing::info!(step = %step, "Prescription step passed");
    Ok(Redirect::to(CHECKOUT_PATH))
}

/// Validate the payment form and move on to Review.
///
/// # Errors
///
/// Returns 409 off the Payment step and 500 if the session store fails.
#[instrument(skip(state, session, form))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let mut flow = load_flow(&session).await?;
    match flow.submit_payment(&form) {
        Ok(step) => {
            save_flow(&session, &flow).await?;
            tracing::info!(step = %step, "Payment details accepted");
            Ok(Redirect::to(CHECKOUT_PATH).into_response())
        }
        Err(CheckoutError::Invalid(errors)) => {
            tracing::debug!(fields = errors.len(), "Payment form rejected");
            let forms = StepForms {
                payment: Some(form.redisplay()),
                errors,
                ..StepForms::default()
            };
            rerender_invalid(&state, &session, &flow, forms).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Go back one step.
///
/// # Errors
///
/// Returns 409 from Shipping and Confirmation.
#[instrument(skip(session))]
pub async fn back(session: Session) -> Result<Redirect> {
    let mut flow = load_flow(&session).await?;
    let step = flow.retreat()?;
    save_flow(&session, &flow).await?;
    tracing::debug!(step = %step, "Checkout step back");
    Ok(Redirect::to(CHECKOUT_PATH))
}

/// Place the order from the Review step.
///
/// The order service receives the full payload. On success the flow moves to
/// Confirmation, the cart is emptied and the placed order becomes the
/// dashboard's most recent order.
///
/// # Errors
///
/// Returns 400 for an empty cart, 409 off the Review step and 502 if the
/// order service fails.
#[instrument(skip(state, session))]
pub async fn place_order(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut flow = load_flow(&session).await?;
    let mut cart = cart::load_cart(&session, state.catalog()).await?;
    // Off the Review step this is a transition error, whatever the cart holds.
    let payload = flow.payload(&cart)?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let order = state.orders().place_order(&payload).await?;
    flow.place_order()?;

    save_flow(&session, &flow).await?;
    cart.clear();
    cart::save_cart(&session, &cart).await?;
    session.insert(keys::LAST_ORDER, &order).await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", order.id.as_str())]),
    );
    tracing::info!(order_id = %order.id, status = %order.status, "Order placed");
    Ok(Redirect::to(CHECKOUT_PATH))
}

/// Leave the Confirmation step for the dashboard and start a fresh checkout.
///
/// # Errors
///
/// Returns 409 unless the checkout is at Confirmation.
#[instrument(skip(session))]
pub async fn finish(session: Session) -> Result<Redirect> {
    let flow = load_flow(&session).await?;
    if !flow.current_step().is_terminal() {
        return Err(TransitionError {
            from: flow.current_step(),
            action: CheckoutAction::Advance,
        }
        .into());
    }
    session.remove::<CheckoutFlow>(keys::CHECKOUT).await?;
    Ok(Redirect::to(DASHBOARD_PATH))
}

/// Validate form values against a named schema.
///
/// Used by `checkout.js` to re-run validation on every field change.
///
/// # Errors
///
/// Returns 404 for unknown schema names.
#[instrument(skip(values))]
pub async fn validate_fields(
    Path(schema): Path<String>,
    Json(values): Json<HashMap<String, String>>,
) -> Result<Json<Validation>> {
    let schema: Schema = schema.parse().map_err(AppError::NotFound)?;
    Ok(Json(validate(schema, &values)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_new_session_starts_at_shipping() {
        let flow = load_flow(&session()).await.unwrap();
        assert_eq!(flow.current_step(), CheckoutStep::Shipping);
    }

    #[tokio::test]
    async fn test_back_from_shipping_is_conflict() {
        let err = back(session()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_prescription_requires_prescription_step() {
        let err = submit_prescription(session()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_finish_requires_confirmation() {
        let err = finish(session()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_back_label_follows_transition_table() {
        assert_eq!(back_label(CheckoutStep::Shipping), None);
        assert_eq!(
            back_label(CheckoutStep::Prescription).as_deref(),
            Some("Back to Shipping")
        );
        assert_eq!(
            back_label(CheckoutStep::Review).as_deref(),
            Some("Back to Payment")
        );
        assert_eq!(back_label(CheckoutStep::Confirmation), None);
    }

    #[test]
    fn test_stepper_marks_current_step() {
        let steps = stepper(&CheckoutFlow::new());
        assert_eq!(steps.len(), 4);
        assert!(steps[0].active);
        assert!(steps.iter().skip(1).all(|s| !s.active && !s.completed));
    }

    #[tokio::test]
    async fn test_validate_unknown_schema_is_not_found() {
        let err = validate_fields(Path("billing".to_string()), Json(HashMap::new()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validate_reports_field_errors() {
        let values = HashMap::from([
            ("cardholderName".to_string(), "Alex Doe".to_string()),
            ("cardNumber".to_string(), "1234".to_string()),
            ("expiryDate".to_string(), "12/27".to_string()),
            ("cvc".to_string(), "123".to_string()),
        ]);
        let Json(result) = validate_fields(Path("payment".to_string()), Json(values))
            .await
            .unwrap();
        assert!(!result.valid);
        assert!(result.errors.contains("cardNumber"));
        assert_eq!(result.errors.len(), 1);
    }
}
