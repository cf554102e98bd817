//! Runtime types.

use gotham_store::{MergeOutcome, PaneKind, PaneUpdate};
use serde::Serialize;

/// What happened to an analytics fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchOutcome {
    /// The response landed in its pane; carries the item count.
    Applied(usize),
    /// The selection changed while the request was in flight; dropped.
    Stale,
    /// Nothing requested: no selection, or the pane does not apply to the
    /// focal entity's type.
    Skipped,
}

impl From<PaneUpdate> for FetchOutcome {
    fn from(update: PaneUpdate) -> Self {
        match update {
            PaneUpdate::Applied(n) => Self::Applied(n),
            PaneUpdate::Stale => Self::Stale,
        }
    }
}

/// Result of resolving a case's entity links into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseLoad {
    #[serde(rename = "caseId")]
    pub case_id: String,
    /// Entities resolved from the case's links.
    pub resolved: usize,
    /// How many of them were new to the workspace.
    pub merged: MergeOutcome,
}

/// One pane's result from a bulk analytics refresh.
#[derive(Debug)]
pub struct PaneRefresh {
    pub kind: PaneKind,
    pub outcome: gotham_core::Result<FetchOutcome>,
}
