//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::content::ContentStore;
use crate::services::{
    Catalog, OrderService, PlaceholderCatalog, PrescriptionStore, SimulatedOrderService,
    SimulatedPrescriptionStore,
};

/// The collaborators pages depend on.
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn Catalog>,
    pub orders: Arc<dyn OrderService>,
    pub prescriptions: Arc<dyn PrescriptionStore>,
}

impl Services {
    /// Built-in placeholder data and simulated collaborators.
    #[must_use]
    pub fn simulated(config: &StorefrontConfig) -> Self {
        Self {
            catalog: Arc::new(PlaceholderCatalog::new()),
            orders: Arc::new(SimulatedOrderService),
            prescriptions: Arc::new(SimulatedPrescriptionStore::new(config.upload_delay)),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, content and the page collaborators.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    content: ContentStore,
    services: Services,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, content: ContentStore, services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                content,
                services,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the markdown content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn Catalog {
        self.inner.services.catalog.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderService {
        self.inner.services.orders.as_ref()
    }

    #[must_use]
    pub fn prescriptions(&self) -> &dyn PrescriptionStore {
        self.inner.services.prescriptions.as_ref()
    }
}
