//! Order lifecycle status and the progress tracker built from it.
//!
//! The tracker is a pure function of the current status: four linear steps
//! (`Pending Verification` → `Processing` → `Shipped` → `Delivered`) plus a
//! disjoint `Cancelled` terminal that replaces the step list entirely.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Pending Verification")]
    PendingVerification,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The linear progression shown by the tracker. `Cancelled` is not on it.
    pub const PROGRESSION: [Self; 4] = [
        Self::PendingVerification,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Human-readable label, also used as the wire/serde form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingVerification => "Pending Verification",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Badge style for order tables.
    #[must_use]
    pub const fn badge(self) -> BadgeVariant {
        match self {
            Self::Delivered => BadgeVariant::Default,
            Self::Shipped | Self::PendingVerification | Self::Processing => {
                BadgeVariant::Secondary
            }
            Self::Cancelled => BadgeVariant::Destructive,
        }
    }

    /// Position on the linear progression, `None` for `Cancelled`.
    #[must_use]
    pub fn position(self) -> Option<usize> {
        Self::PROGRESSION.iter().position(|s| *s == self)
    }

    /// Icon name used by the tracker for this step.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::PendingVerification => "clipboard-check",
            Self::Processing => "loader",
            Self::Shipped => "truck",
            Self::Delivered => "package-check",
            Self::Cancelled => "x-circle",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending Verification" => Ok(Self::PendingVerification),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Display variant for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
    /// Fallback for labels that do not name a known status.
    Outline,
}

impl BadgeVariant {
    /// Badge for a raw status label coming from an external source.
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        label
            .parse::<OrderStatus>()
            .map_or(Self::Outline, OrderStatus::badge)
    }

    /// CSS modifier class used by the templates.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Default => "badge badge-default",
            Self::Secondary => "badge badge-secondary",
            Self::Destructive => "badge badge-destructive",
            Self::Outline => "badge badge-outline",
        }
    }
}

/// Visual state of one step in a linear progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

impl StepState {
    /// State of the step at `index` given the index of the current step.
    ///
    /// A `current` of `None` (status not on the line) leaves every step pending.
    #[must_use]
    pub fn at(index: usize, current: Option<usize>) -> Self {
        match current {
            Some(current) if index < current => Self::Completed,
            Some(current) if index == current => Self::Active,
            _ => Self::Pending,
        }
    }

    /// CSS modifier used by the templates.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Completed => "step-completed",
            Self::Active => "step-active",
            Self::Pending => "step-pending",
        }
    }
}

/// One rendered step of the order tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStep {
    pub status: OrderStatus,
    pub state: StepState,
    /// Spinner animation; only the active `Processing` step spins.
    pub animated: bool,
}

impl TrackerStep {
    /// Step label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.status.label()
    }

    /// Icon name.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        self.status.icon()
    }

    /// Whether the connector after this step is filled.
    #[must_use]
    pub fn connector_filled(&self) -> bool {
        self.state == StepState::Completed
    }
}

/// Visual state of the order tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTracker {
    /// Standalone cancellation notice, no step list.
    Cancelled,
    /// The four-step progression.
    Progress(Vec<TrackerStep>),
}

impl OrderTracker {
    /// Build the tracker for a known status.
    #[must_use]
    pub fn for_status(status: OrderStatus) -> Self {
        if status == OrderStatus::Cancelled {
            return Self::Cancelled;
        }
        Self::progress(status.position())
    }

    /// Build the tracker for a raw status label.
    ///
    /// Labels that are neither on the progression nor `Cancelled` render every
    /// step as pending.
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        label
            .parse::<OrderStatus>()
            .map_or_else(|_| Self::progress(None), Self::for_status)
    }

    fn progress(current: Option<usize>) -> Self {
        let steps = OrderStatus::PROGRESSION
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let state = StepState::at(index, current);
                TrackerStep {
                    status: *status,
                    state,
                    animated: *status == OrderStatus::Processing && state == StepState::Active,
                }
            })
            .collect();
        Self::Progress(steps)
    }

    /// Whether only the cancellation notice is shown.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The step list; empty for a cancelled order.
    #[must_use]
    pub fn steps(&self) -> &[TrackerStep] {
        match self {
            Self::Cancelled => &[],
            Self::Progress(steps) => steps,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn states(tracker: &OrderTracker) -> Vec<StepState> {
        tracker.steps().iter().map(|s| s.state).collect()
    }

    #[test]
    fn test_shipped_marks_two_completed_one_active() {
        let tracker = OrderTracker::for_status(OrderStatus::Shipped);
        assert!(!tracker.is_cancelled());
        assert_eq!(
            states(&tracker),
            vec![
                StepState::Completed,
                StepState::Completed,
                StepState::Active,
                StepState::Pending,
            ]
        );
    }

    #[test]
    fn test_pending_verification_is_first_active() {
        let tracker = OrderTracker::for_status(OrderStatus::PendingVerification);
        assert_eq!(
            states(&tracker),
            vec![
                StepState::Active,
                StepState::Pending,
                StepState::Pending,
                StepState::Pending,
            ]
        );
    }

    #[test]
    fn test_delivered_has_no_pending_steps() {
        let tracker = OrderTracker::for_status(OrderStatus::Delivered);
        assert_eq!(states(&tracker)[3], StepState::Active);
        assert!(states(&tracker)[..3].iter().all(|s| *s == StepState::Completed));
    }

    #[test]
    fn test_cancelled_renders_notice_only() {
        let tracker = OrderTracker::for_status(OrderStatus::Cancelled);
        assert!(tracker.is_cancelled());
        assert!(tracker.steps().is_empty());

        assert_eq!(OrderTracker::for_label("Cancelled"), OrderTracker::Cancelled);
    }

    #[test]
    fn test_unknown_label_leaves_every_step_pending() {
        let tracker = OrderTracker::for_label("Lost In Transit");
        assert_eq!(states(&tracker), vec![StepState::Pending; 4]);
    }

    #[test]
    fn test_only_active_processing_spins() {
        let tracker = OrderTracker::for_status(OrderStatus::Processing);
        let animated: Vec<bool> = tracker.steps().iter().map(|s| s.animated).collect();
        assert_eq!(animated, vec![false, true, false, false]);

        let tracker = OrderTracker::for_status(OrderStatus::Shipped);
        assert!(tracker.steps().iter().all(|s| !s.animated));
    }

    #[test]
    fn test_badge_table() {
        assert_eq!(OrderStatus::Delivered.badge(), BadgeVariant::Default);
        assert_eq!(OrderStatus::Shipped.badge(), BadgeVariant::Secondary);
        assert_eq!(OrderStatus::Processing.badge(), BadgeVariant::Secondary);
        assert_eq!(
            OrderStatus::PendingVerification.badge(),
            BadgeVariant::Secondary
        );
        assert_eq!(OrderStatus::Cancelled.badge(), BadgeVariant::Destructive);
        assert_eq!(BadgeVariant::for_label("Returned"), BadgeVariant::Outline);
    }

    #[test]
    fn test_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&OrderStatus::PendingVerification).unwrap();
        assert_eq!(json, "\"Pending Verification\"");

        for status in OrderStatus::PROGRESSION {
            assert_eq!(status.label().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
