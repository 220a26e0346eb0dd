//! Multi-step checkout flow.
//!
//! The flow is a closed enumeration of steps driven by a single transition
//! table. Every move that the table does not list is rejected with a typed
//! [`TransitionError`] and leaves the current step untouched.
//!
//! ```text
//! Shipping ──advance──▶ Prescription ──advance──▶ Payment ──advance──▶ Review ──place_order──▶ Confirmation
//!          ◀─retreat───              ◀─retreat───         ◀─retreat───
//! ```
//!
//! `advance` out of Shipping and Payment is gated on a validated form for that
//! step. Review is left forward only through `place_order`, and Confirmation
//! is terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Cart, Price, ShippingMethod, StepState};
use crate::validation::{FieldErrors, PaymentForm, PaymentInfo, ShippingForm, ShippingInfo};

/// One stage of the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Prescription,
    Payment,
    Review,
    Confirmation,
}

impl CheckoutStep {
    /// Steps shown on the progress indicator. Confirmation replaces it.
    pub const VISIBLE: [Self; 4] = [Self::Shipping, Self::Prescription, Self::Payment, Self::Review];

    /// 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Prescription => 2,
            Self::Payment => 3,
            Self::Review => 4,
            Self::Confirmation => 5,
        }
    }

    /// Step from its 1-based number.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Shipping),
            2 => Some(Self::Prescription),
            3 => Some(Self::Payment),
            4 => Some(Self::Review),
            5 => Some(Self::Confirmation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Prescription => "Prescription",
            Self::Payment => "Payment",
            Self::Review => "Review",
            Self::Confirmation => "Confirmation",
        }
    }

    /// The transition table.
    #[must_use]
    pub const fn transition(self, action: CheckoutAction) -> Option<Self> {
        match (self, action) {
            (Self::Shipping, CheckoutAction::Advance) => Some(Self::Prescription),
            (Self::Prescription, CheckoutAction::Advance) => Some(Self::Payment),
            (Self::Payment, CheckoutAction::Advance) => Some(Self::Review),
            (Self::Review, CheckoutAction::PlaceOrder) => Some(Self::Confirmation),
            (Self::Prescription, CheckoutAction::Retreat) => Some(Self::Shipping),
            (Self::Payment, CheckoutAction::Retreat) => Some(Self::Prescription),
            (Self::Review, CheckoutAction::Retreat) => Some(Self::Payment),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmation)
    }

    /// Whether a back control is offered on this step.
    #[must_use]
    pub const fn can_retreat(self) -> bool {
        self.transition(CheckoutAction::Retreat).is_some()
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title(), self.number())
    }
}

/// A user action on the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutAction {
    Advance,
    Retreat,
    PlaceOrder,
}

impl std::fmt::Display for CheckoutAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advance => f.write_str("advance"),
            Self::Retreat => f.write_str("retreat"),
            Self::PlaceOrder => f.write_str("place order"),
        }
    }
}

/// A move the transition table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} from {from}")]
pub struct TransitionError {
    pub from: CheckoutStep,
    pub action: CheckoutAction,
}

/// Why a checkout move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The step's form failed validation.
    #[error("{0}")]
    Invalid(FieldErrors),
    /// The move is not in the transition table.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// The step's gate has not been satisfied yet.
    #[error("{0} details have not been submitted")]
    MissingDetails(CheckoutStep),
}

/// Everything an order service needs to place the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPayload {
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    pub cart: Cart,
    pub total: Price,
}

/// A stepper entry for the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    pub step: CheckoutStep,
    pub state: StepState,
}

/// Per-session checkout state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    shipping: Option<ShippingInfo>,
    payment: Option<PaymentInfo>,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current_step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingInfo> {
        self.shipping.as_ref()
    }

    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentInfo> {
        self.payment.as_ref()
    }

    /// Shipping method chosen so far, standard until the form is submitted.
    #[must_use]
    pub fn shipping_method(&self) -> ShippingMethod {
        self.shipping
            .as_ref()
            .map_or_else(ShippingMethod::default, |s| s.shipping_method)
    }

    fn apply(&mut self, action: CheckoutAction) -> Result<CheckoutStep, TransitionError> {
        let next = self.step.transition(action).ok_or(TransitionError {
            from: self.step,
            action,
        })?;
        self.step = next;
        Ok(next)
    }

    /// Validate the shipping form and, if it passes, advance past Shipping.
    ///
    /// # Errors
    ///
    /// `Invalid` with per-field messages, or `Transition` when the flow is not
    /// on the Shipping step. The step is unchanged on error.
    pub fn submit_shipping(&mut self, form: &ShippingForm) -> Result<CheckoutStep, CheckoutError> {
        self.require_step(CheckoutStep::Shipping)?;
        let info = form.validate().map_err(CheckoutError::Invalid)?;
        self.shipping = Some(info);
        self.advance()
    }

    /// Validate the payment form and, if it passes, advance past Payment.
    ///
    /// # Errors
    ///
    /// `Invalid` with per-field messages, or `Transition` when the flow is not
    /// on the Payment step. The step is unchanged on error.
    pub fn submit_payment(&mut self, form: &PaymentForm) -> Result<CheckoutStep, CheckoutError> {
        self.require_step(CheckoutStep::Payment)?;
        let info = form.validate().map_err(CheckoutError::Invalid)?;
        self.payment = Some(info);
        self.advance()
    }

    fn require_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.step,
                action: CheckoutAction::Advance,
            }
            .into())
        }
    }

    /// Move forward one step.
    ///
    /// # Errors
    ///
    /// `MissingDetails` when leaving Shipping or Payment without a validated
    /// form, `Transition` from Review (use [`Self::place_order`]) and from
    /// Confirmation.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        let gate_open = match self.step {
            CheckoutStep::Shipping => self.shipping.is_some(),
            CheckoutStep::Payment => self.payment.is_some(),
            CheckoutStep::Prescription | CheckoutStep::Review | CheckoutStep::Confirmation => true,
        };
        if !gate_open {
            return Err(CheckoutError::MissingDetails(self.step));
        }
        Ok(self.apply(CheckoutAction::Advance)?)
    }

    /// Move back one step. Submitted details are kept.
    ///
    /// # Errors
    ///
    /// `TransitionError` from Shipping and from Confirmation.
    pub fn retreat(&mut self) -> Result<CheckoutStep, TransitionError> {
        self.apply(CheckoutAction::Retreat)
    }

    /// Assemble the order payload. Only available on the Review step.
    ///
    /// # Errors
    ///
    /// `Transition` off the Review step, `MissingDetails` if either form is
    /// missing.
    pub fn payload(&self, cart: &Cart) -> Result<CheckoutPayload, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(TransitionError {
                from: self.step,
                action: CheckoutAction::PlaceOrder,
            }
            .into());
        }
        let shipping = self
            .shipping
            .clone()
            .ok_or(CheckoutError::MissingDetails(CheckoutStep::Shipping))?;
        let payment = self
            .payment
            .clone()
            .ok_or(CheckoutError::MissingDetails(CheckoutStep::Payment))?;
        Ok(CheckoutPayload {
            total: cart.total(shipping.shipping_method),
            shipping,
            payment,
            cart: cart.clone(),
        })
    }

    /// Review → Confirmation. One way: Confirmation has no outgoing moves.
    ///
    /// # Errors
    ///
    /// `TransitionError` from any step other than Review.
    pub fn place_order(&mut self) -> Result<CheckoutStep, TransitionError> {
        let step = self.apply(CheckoutAction::PlaceOrder)?;
        // Card details are not kept once the order has been handed off.
        self.payment = None;
        Ok(step)
    }

    /// Stepper states for the visible steps.
    #[must_use]
    pub fn progress(&self) -> Vec<StepProgress> {
        let current = CheckoutStep::VISIBLE.iter().position(|s| *s == self.step);
        CheckoutStep::VISIBLE
            .iter()
            .enumerate()
            .map(|(index, step)| {
                // Past the last visible step everything is completed.
                let state = if self.step.is_terminal() {
                    StepState::Completed
                } else {
                    StepState::at(index, current)
                };
                StepProgress { step: *step, state }
            })
            .collect()
    }
}
