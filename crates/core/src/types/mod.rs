//! Core types for MediCart.
//!
//! Type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{Cart, CartItem};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductDetails, ShippingMethod};
pub use status::*;
