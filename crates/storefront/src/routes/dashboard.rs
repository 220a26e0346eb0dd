//! User dashboard: order tracking, profile and saved address.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use medicart_core::{Notice, OrderTracker};

use crate::error::Result;
use crate::filters;
use crate::models::session::keys;
use crate::models::{OrderSummary, SavedAddress, UserProfile, take_notice};
use crate::services::PlacedOrder;
use crate::state::AppState;

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Orders,
    Profile,
    Address,
}

impl DashboardTab {
    pub const ALL: [Self; 3] = [Self::Orders, Self::Profile, Self::Address];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Profile => "profile",
            Self::Address => "address",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Orders => "My Orders",
            Self::Profile => "Profile",
            Self::Address => "Address",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

/// A tab link.
#[derive(Clone)]
pub struct TabView {
    pub label: &'static str,
    pub url: String,
    pub active: bool,
}

/// One step of the tracker.
#[derive(Clone)]
pub struct TrackerStepView {
    pub label: &'static str,
    pub icon: &'static str,
    pub css_class: &'static str,
    pub animated: bool,
    pub connector_filled: bool,
    pub is_last: bool,
}

/// Order history row.
#[derive(Clone)]
pub struct OrderRowView {
    pub id: String,
    pub date: String,
    pub status: &'static str,
    pub badge_class: &'static str,
    pub total: String,
}

impl From<&OrderSummary> for OrderRowView {
    fn from(order: &OrderSummary) -> Self {
        Self {
            id: order.id.to_string(),
            date: order.placed_on.format("%Y-%m-%d").to_string(),
            status: order.status.label(),
            badge_class: order.status.badge().css_class(),
            total: order.total.display(),
        }
    }
}

/// Tracker display data. `steps` is empty when the order is cancelled.
#[derive(Clone)]
pub struct TrackerView {
    pub cancelled: bool,
    pub steps: Vec<TrackerStepView>,
}

impl From<&OrderTracker> for TrackerView {
    fn from(tracker: &OrderTracker) -> Self {
        let steps = tracker.steps();
        Self {
            cancelled: tracker.is_cancelled(),
            steps: steps
                .iter()
                .enumerate()
                .map(|(index, step)| TrackerStepView {
                    label: step.label(),
                    icon: step.icon(),
                    css_class: step.state.css_class(),
                    animated: step.animated,
                    connector_filled: step.connector_filled(),
                    is_last: index + 1 == steps.len(),
                })
                .collect(),
        }
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub notice: Option<Notice>,
    pub tab: DashboardTab,
    pub tabs: Vec<TabView>,
    pub recent: OrderRowView,
    pub tracker: TrackerView,
    pub history: Vec<OrderRowView>,
    pub profile: UserProfile,
    pub address: SavedAddress,
}

impl DashboardTemplate {
    #[must_use]
    pub fn is_tab(&self, tab: &str) -> bool {
        self.tab.as_str() == tab
    }
}

/// The order tracked at the top of the dashboard and the history below it.
///
/// An order placed in this session is the most recent one and pushes the
/// catalog's latest order into the history.
fn orders_for(
    placed: Option<&PlacedOrder>,
    latest: OrderSummary,
    mut history: Vec<OrderSummary>,
) -> (OrderSummary, Vec<OrderSummary>) {
    match placed {
        Some(order) => {
            history.insert(0, latest);
            (OrderSummary::from(order), history)
        }
        None => (latest, history),
    }
}

/// Display the dashboard.
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse> {
    let tab = DashboardTab::ALL
        .into_iter()
        .find(|t| query.tab.as_deref() == Some(t.as_str()))
        .unwrap_or_default();

    let placed = session.get::<PlacedOrder>(keys::LAST_ORDER).await?;
    let (recent, history) = orders_for(
        placed.as_ref(),
        state.catalog().latest_order().await,
        state.catalog().order_history().await,
    );
    let profile = state.catalog().user_profile().await;

    tracing::debug!(order_id = %recent.id, status = %recent.status, "Tracking order");

    Ok(DashboardTemplate {
        notice: take_notice(&session).await,
        tab,
        tabs: DashboardTab::ALL
            .into_iter()
            .map(|t| TabView {
                label: t.label(),
                url: format!("/user-dashboard?tab={}", t.as_str()),
                active: t == tab,
            })
            .collect(),
        tracker: TrackerView::from(&OrderTracker::for_status(recent.status)),
        recent: OrderRowView::from(&recent),
        history: history.iter().map(OrderRowView::from).collect(),
        address: profile.address.clone(),
        profile,
    })
}
