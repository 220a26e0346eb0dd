//! Shopper account data shown on the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use medicart_core::{OrderId, OrderStatus, Price};

/// A row in the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub placed_on: NaiveDate,
    pub total: Price,
    pub status: OrderStatus,
}

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    /// Free-form, e.g. "August 2023".
    pub member_since: String,
    pub address: SavedAddress,
}

/// Default shipping address on file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedAddress {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub postcode: String,
}
