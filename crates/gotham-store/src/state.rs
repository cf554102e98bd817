//! Investigation state container.
//!
//! `InvestigationState` is a plain value with a fixed set of named
//! transitions, so every transition can be exercised against an explicit
//! prior state. `Workspace` shares one state between components: each
//! transition runs under a single write lock and is therefore one observable
//! step, and selection changes are broadcast to subscribers.

use chrono::{DateTime, Utc};
use gotham_core::{
    AuditLogEntry, Case, Entity, GothamConfig, GraphData, Relationship, Role, SearchResult,
};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cases::CaseRegistry;
use crate::graph::{GraphStore, MergeOutcome};
use crate::panes::{AnalyticsPanes, AnalyticsPayload, PaneKind, PaneUpdate, SelectionTicket};
use crate::toasts::{NotificationQueue, ToastKind};
use crate::view::{Navigation, ViewMode};

#[derive(Debug, Clone, Default)]
pub struct InvestigationState {
    graph: GraphStore,
    selected: Option<Entity>,
    selection_generation: u64,
    cases: CaseRegistry,
    toasts: NotificationQueue,
    view_mode: ViewMode,
    navigation: Navigation,
    role: Role,
    search_results: Vec<SearchResult>,
    panes: AnalyticsPanes,
    audit_logs: Vec<AuditLogEntry>,
}

impl InvestigationState {
    pub fn new(role: Role, toasts: NotificationQueue) -> Self {
        Self {
            role,
            toasts,
            ..Self::default()
        }
    }

    pub fn from_config(config: &GothamConfig) -> Self {
        let toasts = match config.toast_ttl_secs {
            Some(ttl) => NotificationQueue::with_ttl_secs(ttl),
            None => NotificationQueue::new(),
        };
        Self::new(config.role, toasts)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn nodes(&self) -> &[Entity] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Relationship] {
        self.graph.edges()
    }

    pub fn selected(&self) -> Option<&Entity> {
        self.selected.as_ref()
    }

    pub fn selection_generation(&self) -> u64 {
        self.selection_generation
    }

    /// Ticket for the current selection, if any.
    pub fn current_ticket(&self) -> Option<SelectionTicket> {
        self.selected.as_ref().map(|entity| SelectionTicket {
            generation: self.selection_generation,
            entity_id: entity.id.clone(),
            entity_type: entity.entity_type.clone(),
        })
    }

    pub fn cases(&self) -> &CaseRegistry {
        &self.cases
    }

    pub fn active_case(&self) -> Option<&Case> {
        self.cases.active_case()
    }

    pub fn toasts(&self) -> &NotificationQueue {
        &self.toasts
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub fn is_searching(&self) -> bool {
        !self.search_results.is_empty()
    }

    pub fn panes(&self) -> &AnalyticsPanes {
        &self.panes
    }

    pub fn audit_logs(&self) -> &[AuditLogEntry] {
        &self.audit_logs
    }

    // ---------------------------------------------------------------
    // Graph transitions
    // ---------------------------------------------------------------

    pub fn replace_nodes(&mut self, nodes: Vec<Entity>) {
        self.graph.replace_nodes(nodes);
    }

    pub fn replace_edges(&mut self, edges: Vec<Relationship>) {
        self.graph.replace_edges(edges);
    }

    pub fn merge_graph_data(&mut self, batch: GraphData) -> MergeOutcome {
        self.graph.merge(batch)
    }

    /// Set or clear the focal entity. Every call starts a new selection
    /// generation and resets the analytics panes.
    pub fn select_entity(&mut self, entity: Option<Entity>) -> Option<SelectionTicket> {
        self.selected = entity;
        self.bump_generation();
        self.current_ticket()
    }

    /// Empty nodes, edges and selection together.
    pub fn clear_graph(&mut self) {
        self.graph.clear();
        self.selected = None;
        self.bump_generation();
    }

    fn bump_generation(&mut self) {
        self.selection_generation += 1;
        self.panes.reset(self.selection_generation);
    }

    // ---------------------------------------------------------------
    // Analytics panes
    // ---------------------------------------------------------------

    /// Mark `kind` loading for the current selection and hand out the
    /// ticket the response must present. `None` when there is no selection
    /// or the focal entity's type does not fit the pane.
    pub fn begin_load(&mut self, kind: PaneKind) -> Option<SelectionTicket> {
        let ticket = self.current_ticket()?;
        if let Some(required) = kind.required_entity_type() {
            if ticket.entity_type != required {
                return None;
            }
        }
        self.panes.set_loading(kind, true);
        Some(ticket)
    }

    pub fn finish_load(&mut self, ticket: &SelectionTicket, payload: AnalyticsPayload) -> PaneUpdate {
        if ticket.generation != self.selection_generation {
            debug!(
                "Dropping stale {:?} response for {} (generation {} < {})",
                payload.kind(),
                ticket.entity_id,
                ticket.generation,
                self.selection_generation
            );
            return PaneUpdate::Stale;
        }
        PaneUpdate::Applied(self.panes.fill(payload))
    }

    /// Clear the loading flag after a failed request, keeping prior data.
    pub fn fail_load(&mut self, ticket: &SelectionTicket, kind: PaneKind) -> PaneUpdate {
        if ticket.generation != self.selection_generation {
            return PaneUpdate::Stale;
        }
        self.panes.set_loading(kind, false);
        PaneUpdate::Applied(0)
    }

    // ---------------------------------------------------------------
    // Cases
    // ---------------------------------------------------------------

    pub fn set_cases(&mut self, cases: Vec<Case>) {
        self.cases.set_cases(cases);
    }

    pub fn set_active_case(&mut self, case_id: Option<&str>) -> bool {
        self.cases.set_active(case_id)
    }

    pub fn add_created_case(&mut self, case: Case) {
        self.cases.add_created(case);
    }

    // ---------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------

    pub fn push_toast(&mut self, message: impl Into<String>, kind: ToastKind) -> String {
        self.toasts.push(message, kind)
    }

    pub fn dismiss_toast(&mut self, id: &str) -> bool {
        self.toasts.dismiss(id)
    }

    pub fn expire_toasts(&mut self, now: DateTime<Utc>) -> usize {
        self.toasts.expire(now)
    }

    /// Drop notices past their TTL as of `now`, then drain the rest.
    pub fn take_live_toasts(&mut self, now: DateTime<Utc>) -> Vec<crate::toasts::Toast> {
        let expired = self.toasts.expire(now);
        if expired > 0 {
            debug!("Expired {} notifications", expired);
        }
        self.toasts.drain()
    }

    // ---------------------------------------------------------------
    // UI state
    // ---------------------------------------------------------------

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn set_navigation(&mut self, navigation: Navigation) {
        self.navigation = navigation;
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn set_search_results(&mut self, results: Vec<SearchResult>) {
        self.search_results = results;
    }

    pub fn set_audit_logs(&mut self, logs: Vec<AuditLogEntry>) {
        self.audit_logs = logs;
    }
}

/// Shared handle to one investigation state.
pub struct Workspace {
    state: RwLock<InvestigationState>,
    selection_tx: watch::Sender<Option<SelectionTicket>>,
}

impl Workspace {
    pub fn new(state: InvestigationState) -> Self {
        let (selection_tx, _) = watch::channel(state.current_ticket());
        Self {
            state: RwLock::new(state),
            selection_tx,
        }
    }

    pub fn from_config(config: &GothamConfig) -> Self {
        Self::new(InvestigationState::from_config(config))
    }

    /// Receiver that observes every selection change (including clears).
    pub fn subscribe_selection(&self) -> watch::Receiver<Option<SelectionTicket>> {
        self.selection_tx.subscribe()
    }

    pub fn snapshot(&self) -> InvestigationState {
        self.state.read().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&InvestigationState) -> R) -> R {
        f(&*self.state.read())
    }

    /// Run one transition under the write lock, publishing the selection if
    /// the transition changed it.
    pub fn update<R>(&self, f: impl FnOnce(&mut InvestigationState) -> R) -> R {
        let mut state = self.state.write();
        let before = state.selection_generation();
        let result = f(&mut *state);
        if state.selection_generation() != before {
            self.selection_tx.send_replace(state.current_ticket());
        }
        result
    }

    pub fn select_entity(&self, entity: Option<Entity>) -> Option<SelectionTicket> {
        if let Some(e) = &entity {
            info!("Selected {} {}", e.entity_type, e.id);
        }
        self.update(|s| s.select_entity(entity))
    }

    pub fn merge_graph_data(&self, batch: GraphData) -> MergeOutcome {
        self.update(|s| s.merge_graph_data(batch))
    }

    pub fn clear_graph(&self) {
        self.update(InvestigationState::clear_graph);
    }

    pub fn push_toast(&self, message: impl Into<String>, kind: ToastKind) -> String {
        self.update(|s| s.push_toast(message, kind))
    }

    pub fn dismiss_toast(&self, id: &str) -> bool {
        self.update(|s| s.dismiss_toast(id))
    }

    /// Notices still within their TTL, removed from the queue.
    pub fn take_toasts(&self) -> Vec<crate::toasts::Toast> {
        self.update(|s| s.take_live_toasts(Utc::now()))
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.update(|s| s.set_view_mode(mode));
    }

    pub fn set_navigation(&self, navigation: Navigation) {
        self.update(|s| s.set_navigation(navigation));
    }

    pub fn set_role(&self, role: Role) {
        self.update(|s| s.set_role(role));
    }

    pub fn current_ticket(&self) -> Option<SelectionTicket> {
        self.read(InvestigationState::current_ticket)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(InvestigationState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotham_core::{entity_types, ContactFrequency, MoneyHop};

    fn phone() -> Entity {
        Entity::new("PH1", entity_types::PHONE).with_property("msisdn", "447700900123")
    }

    fn account() -> Entity {
        Entity::new("AC1", entity_types::ACCOUNT).with_property("account_id", "GB00-1")
    }

    #[test]
    fn test_clear_resets_graph_and_selection_together() {
        let workspace = Workspace::default();
        workspace.merge_graph_data(GraphData {
            nodes: vec![phone(), account()],
            edges: vec![Relationship::new("R1", "PH1", "AC1", "LINKED")],
        });
        workspace.select_entity(Some(phone()));

        let mut rx = workspace.subscribe_selection();
        workspace.clear_graph();

        let state = workspace.snapshot();
        assert!(state.nodes().is_empty());
        assert!(state.edges().is_empty());
        assert!(state.selected().is_none());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), None);
    }

    #[test]
    fn test_selection_publishes_ticket() {
        let workspace = Workspace::default();
        let rx = workspace.subscribe_selection();

        let ticket = workspace.select_entity(Some(phone())).unwrap();
        assert_eq!(rx.borrow().as_ref(), Some(&ticket));
        assert_eq!(ticket.entity_type, "Phone");

        // Non-selection transitions do not publish.
        let mut rx = workspace.subscribe_selection();
        rx.borrow_and_update();
        workspace.push_toast("hello", ToastKind::Info);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_begin_load_respects_entity_type() {
        let mut state = InvestigationState::default();
        assert!(state.begin_load(PaneKind::Timeline).is_none());

        state.select_entity(Some(account()));
        assert!(state.begin_load(PaneKind::Contacts).is_none());
        assert!(!state.panes().is_loading(PaneKind::Contacts));
        assert!(state.begin_load(PaneKind::MoneyTrail).is_some());
        assert!(state.panes().is_loading(PaneKind::MoneyTrail));
    }

    #[test]
    fn test_out_of_order_responses_stay_with_their_view() {
        let mut state = InvestigationState::default();

        state.select_entity(Some(phone()));
        let comms_ticket = state.begin_load(PaneKind::Contacts).unwrap();

        state.select_entity(Some(account()));
        let finance_ticket = state.begin_load(PaneKind::MoneyTrail).unwrap();

        // Finance resolves first, then the slow comms response arrives.
        let applied = state.finish_load(
            &finance_ticket,
            AnalyticsPayload::MoneyTrail(vec![MoneyHop {
                account_id: "GB00-1".into(),
                amount: 5000.0,
            }]),
        );
        assert_eq!(applied, PaneUpdate::Applied(1));

        let stale = state.finish_load(
            &comms_ticket,
            AnalyticsPayload::Contacts(vec![ContactFrequency {
                phone: "447700900999".into(),
                count: 12,
                calls: Some(10),
                messages: Some(2),
            }]),
        );
        assert_eq!(stale, PaneUpdate::Stale);

        assert!(!state.panes().is_loaded(PaneKind::Contacts));
        assert_eq!(state.panes().money_trail.items().len(), 1);
        assert_eq!(state.selected().unwrap().id, "AC1");
    }

    #[test]
    fn test_fail_load_keeps_prior_data() {
        let mut state = InvestigationState::default();
        state.select_entity(Some(phone()));

        let first = state.begin_load(PaneKind::Timeline).unwrap();
        state.finish_load(&first, AnalyticsPayload::Timeline(vec![]));
        assert!(state.panes().is_loaded(PaneKind::Timeline));

        let retry = state.begin_load(PaneKind::Timeline).unwrap();
        assert_eq!(state.fail_load(&retry, PaneKind::Timeline), PaneUpdate::Applied(0));
        assert!(!state.panes().is_loading(PaneKind::Timeline));
        assert!(state.panes().is_loaded(PaneKind::Timeline));
    }

    #[test]
    fn test_clear_invalidates_in_flight_requests() {
        let mut state = InvestigationState::default();
        state.select_entity(Some(phone()));
        let ticket = state.begin_load(PaneKind::Mentions).unwrap();

        state.clear_graph();
        assert_eq!(
            state.finish_load(&ticket, AnalyticsPayload::Mentions(vec![])),
            PaneUpdate::Stale
        );
    }

    #[test]
    fn test_search_results_drive_is_searching() {
        let mut state = InvestigationState::default();
        assert!(!state.is_searching());
        state.set_search_results(vec![SearchResult {
            id: "P1".into(),
            entity_type: "Person".into(),
            display_name: "Ayaan".into(),
            properties: Default::default(),
        }]);
        assert!(state.is_searching());
        state.set_search_results(Vec::new());
        assert!(!state.is_searching());
    }

    #[test]
    fn test_from_config_applies_role_and_ttl() {
        let config = GothamConfig {
            role: Role::Investigator,
            toast_ttl_secs: Some(1),
            ..GothamConfig::default()
        };
        let mut state = InvestigationState::from_config(&config);
        assert_eq!(state.role(), Role::Investigator);

        state.push_toast("short lived", ToastKind::Info);
        assert_eq!(state.expire_toasts(Utc::now() + chrono::Duration::seconds(2)), 1);
    }

    #[test]
    fn test_take_live_toasts_skips_expired() {
        let config = GothamConfig {
            toast_ttl_secs: Some(5),
            ..GothamConfig::default()
        };
        let mut state = InvestigationState::from_config(&config);
        state.push_toast("old news", ToastKind::Info);
        let later = Utc::now() + chrono::Duration::seconds(10);
        assert!(state.take_live_toasts(later).is_empty());

        state.push_toast("fresh", ToastKind::Success);
        let toasts = state.take_live_toasts(Utc::now());
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "fresh");
        assert!(state.take_live_toasts(Utc::now()).is_empty());

        // Without a TTL nothing ages out.
        let workspace = Workspace::default();
        workspace.push_toast("kept", ToastKind::Warning);
        assert_eq!(workspace.take_toasts().len(), 1);
    }
}
