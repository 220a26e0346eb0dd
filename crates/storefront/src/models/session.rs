//! Session-related types.
//!
//! Everything a shopper accumulates lives in the session; there is no other
//! persistence.

use tower_sessions::Session;

use medicart_core::Notice;

/// Session keys.
pub mod keys {
    /// Key for the serialized `CheckoutFlow`.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the shopper's `Cart`.
    pub const CART: &str = "cart";

    /// Key for the most recently placed order.
    pub const LAST_ORDER: &str = "last_order";

    /// Key for a one-shot `Notice` shown on the next page render.
    pub const NOTICE: &str = "notice";
}

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns the session error if the session store fails.
pub async fn set_notice(session: &Session, notice: &Notice) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::NOTICE, notice).await
}

/// Take the queued notice, if any. Store errors are logged and treated as
/// "no notice".
pub async fn take_notice(session: &Session) -> Option<Notice> {
    match session.remove::<Notice>(keys::NOTICE).await {
        Ok(notice) => notice,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read notice from session");
            None
        }
    }
}
