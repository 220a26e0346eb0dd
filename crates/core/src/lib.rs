//! MediCart Core - domain types and state machines.
//!
//! This crate holds everything the storefront decides without touching the
//! outside world:
//! - [`types`] - Prices, typed IDs, products, carts and order statuses
//! - [`validation`] - Declarative field rules for the checkout forms
//! - [`checkout`] - The multi-step checkout flow and its transition table
//! - [`upload`] - The prescription upload dialog
//!
//! # Architecture
//!
//! No I/O, no HTTP, no clocks. Collaborators that do I/O (catalog, order
//! placement, prescription storage) live behind traits in the storefront.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod types;
pub mod upload;
pub mod validation;

pub use checkout::{CheckoutAction, CheckoutError, CheckoutFlow, CheckoutStep, TransitionError};
pub use types::*;
pub use upload::{Notice, NoticeKind, PrescriptionUpload, UploadError, UploadState, UploadedFile};
pub use validation::{FieldErrors, Schema, Validation, validate};
