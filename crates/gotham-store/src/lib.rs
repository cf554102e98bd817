//! Gotham Store — in-memory investigation state.
//!
//! Holds the aggregated knowledge graph, the case list and active case, the
//! notification queue, view/navigation state and the selection-keyed
//! analytics panes. All mutation goes through named transitions on
//! `InvestigationState`; `Workspace` shares it behind a lock.

pub mod cases;
pub mod graph;
pub mod panes;
pub mod state;
pub mod toasts;
pub mod view;

pub use cases::CaseRegistry;
pub use graph::{GraphStats, GraphStore, MergeOutcome};
pub use panes::{AnalyticsPanes, AnalyticsPayload, Pane, PaneKind, PaneUpdate, SelectionTicket};
pub use state::{InvestigationState, Workspace};
pub use toasts::{NotificationQueue, Toast, ToastKind};
pub use view::{Navigation, ViewMode};
