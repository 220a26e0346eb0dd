//! Collaborators behind the storefront pages.
//!
//! Each external concern is a trait so the simulated implementations can be
//! swapped for real backends without touching the routes.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod prescriptions;

pub use catalog::{Catalog, PlaceholderCatalog, ProductFilter, ProductPage, SortOrder};
pub use orders::{OrderService, OrderServiceError, PlacedOrder, SimulatedOrderService};
pub use prescriptions::{
    PrescriptionStore, SimulatedPrescriptionStore, StoreError, SubmitError, submit_upload,
};
