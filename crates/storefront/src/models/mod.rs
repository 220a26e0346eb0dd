//! Domain models for storefront.

pub mod account;
pub mod session;

pub use account::{OrderSummary, SavedAddress, UserProfile};
pub use session::{set_notice, take_notice};
