//! Orchestrator — turns user actions into API calls and state transitions.
//!
//! Remote failures are caught here: they are logged, surfaced as toasts where
//! the user needs to know, and never leave the workspace half-updated.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use gotham_client::InvestigationApi;
use gotham_core::{
    AuditLogEntry, Case, CaseEntityRef, Document, Entity, Error, GothamConfig, GraphData,
    NewCase, Result, SearchResult,
};
use gotham_store::{
    AnalyticsPayload, MergeOutcome, PaneKind, SelectionTicket, ToastKind, ViewMode, Workspace,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::types::*;

const EXPAND_FAILED: &str = "Network expansion failed. Please check connection.";
const CASE_CREATE_FAILED: &str = "Failed to create case.";
const CASE_LOAD_FAILED: &str = "Failed to load case entities.";
const CASE_LINK_FAILED: &str = "Failed to add entity to case.";

pub struct Orchestrator {
    api: Arc<dyn InvestigationApi>,
    workspace: Arc<Workspace>,
    user_id: String,
    expand_depth: u32,
    trace_depth: u32,
}

impl Orchestrator {
    /// Build an orchestrator with a fresh workspace configured from `config`.
    pub fn new(api: Arc<dyn InvestigationApi>, config: &GothamConfig) -> Self {
        Self::with_workspace(api, Arc::new(Workspace::from_config(config)), config)
    }

    pub fn with_workspace(
        api: Arc<dyn InvestigationApi>,
        workspace: Arc<Workspace>,
        config: &GothamConfig,
    ) -> Self {
        info!(
            "Orchestrator initialized: user={}, role={}, expand_depth={}, trace_depth={}",
            config.user_id, config.role, config.expand_depth, config.trace_depth
        );
        Self {
            api,
            workspace,
            user_id: config.user_id.clone(),
            expand_depth: config.expand_depth,
            trace_depth: config.trace_depth,
        }
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ---------------------------------------------------------------
    // Search and selection
    // ---------------------------------------------------------------

    /// Run a free-text search. A blank query changes nothing.
    pub async fn search(&self, query: &str) -> Result<usize> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(0);
        }
        let results = self.api.search(query).await.map_err(|e| {
            error!("Search failed for {:?}: {}", query, e);
            e
        })?;
        Ok(self.store_results(results))
    }

    pub async fn search_by_type(&self, entity_type: &str, query: &str) -> Result<usize> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(0);
        }
        let results = self
            .api
            .search_by_type(entity_type, query)
            .await
            .map_err(|e| {
                error!("Search failed for {} {:?}: {}", entity_type, query, e);
                e
            })?;
        Ok(self.store_results(results))
    }

    fn store_results(&self, results: Vec<SearchResult>) -> usize {
        let count = results.len();
        debug!("Search returned {} results", count);
        self.workspace.update(|s| s.set_search_results(results));
        count
    }

    /// Fetch a search hit in full, add it to the graph, focus it and close
    /// the result list.
    pub async fn open_search_result(&self, result: &SearchResult) -> Result<Entity> {
        let entity = self.fetch_entity(&result.entity_type, &result.id).await?;
        self.workspace.update(|s| {
            s.merge_graph_data(GraphData::from_nodes(vec![entity.clone()]));
            s.select_entity(Some(entity.clone()));
            s.set_search_results(Vec::new());
        });
        Ok(entity)
    }

    /// Fetch an entity, add it to the graph and focus it.
    pub async fn open_entity(&self, entity_type: &str, id: &str) -> Result<Entity> {
        let entity = self.fetch_entity(entity_type, id).await?;
        self.workspace.update(|s| {
            s.merge_graph_data(GraphData::from_nodes(vec![entity.clone()]));
            s.select_entity(Some(entity.clone()));
        });
        Ok(entity)
    }

    async fn fetch_entity(&self, entity_type: &str, id: &str) -> Result<Entity> {
        self.api.get_entity(entity_type, id).await.map_err(|e| {
            error!("Failed to load entity {} {}: {}", entity_type, id, e);
            e
        })
    }

    pub fn select(&self, entity: Option<Entity>) -> Option<SelectionTicket> {
        self.workspace.select_entity(entity)
    }

    pub fn clear_workspace(&self) {
        info!("Clearing workspace graph");
        self.workspace.clear_graph();
    }

    // ---------------------------------------------------------------
    // Expansion
    // ---------------------------------------------------------------

    pub async fn expand_selected(&self, depth: Option<u32>) -> Result<MergeOutcome> {
        let selected = self
            .workspace
            .read(|s| s.selected().map(|e| (e.entity_type.clone(), e.id.clone())));
        let Some((entity_type, id)) = selected else {
            return Err(Error::InvalidInput("no entity selected".into()));
        };
        self.expand(&entity_type, &id, depth).await
    }

    /// Merge an entity's neighbourhood into the graph.
    pub async fn expand(&self, entity_type: &str, id: &str, depth: Option<u32>) -> Result<MergeOutcome> {
        let depth = depth.unwrap_or(self.expand_depth);
        match self.api.expand_entity(entity_type, id, depth).await {
            Ok(graph) => {
                let outcome = self.workspace.update(|s| {
                    let outcome = s.merge_graph_data(graph);
                    s.push_toast(format!("Expanded network for {}", id), ToastKind::Success);
                    outcome
                });
                info!(
                    "Expanded {} {} (depth {}): +{} nodes, +{} edges",
                    entity_type, id, depth, outcome.added_nodes, outcome.added_edges
                );
                Ok(outcome)
            }
            Err(e) => {
                error!("Expansion failed for {} {}: {}", entity_type, id, e);
                self.workspace.push_toast(EXPAND_FAILED, ToastKind::Error);
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------
    // Cases
    // ---------------------------------------------------------------

    /// Replace the case list with the backend's.
    pub async fn refresh_cases(&self) -> Result<usize> {
        let cases = self.api.list_cases().await.map_err(|e| {
            error!("Failed to fetch cases: {}", e);
            e
        })?;
        let count = cases.len();
        self.workspace.update(|s| s.set_cases(cases));
        Ok(count)
    }

    /// Create a case on the backend, then list and activate it. Nothing is
    /// inserted until the backend confirms.
    pub async fn create_case(&self, name: &str, description: &str) -> Result<Case> {
        let name = name.trim();
        if name.is_empty() {
            self.workspace
                .push_toast("Case name is required.", ToastKind::Warning);
            return Err(Error::InvalidInput("case name is empty".into()));
        }

        let request = NewCase {
            name: name.to_string(),
            description: description.trim().to_string(),
            user_id: self.user_id.clone(),
        };
        match self.api.create_case(&request).await {
            Ok(case) => {
                info!("Created case {} ({})", case.name, case.id);
                self.workspace.update(|s| {
                    s.add_created_case(case.clone());
                    s.push_toast(format!("Case {} created", case.name), ToastKind::Success);
                });
                Ok(case)
            }
            Err(e) => {
                error!("Failed to create case {:?}: {}", name, e);
                self.workspace.push_toast(CASE_CREATE_FAILED, ToastKind::Error);
                Err(e)
            }
        }
    }

    pub async fn get_case(&self, case_id: &str) -> Result<Case> {
        self.api.get_case(case_id).await
    }

    /// Point the active case at a listed case. Unknown ids are refused.
    pub fn activate_case(&self, case_id: &str) -> bool {
        self.workspace.update(|s| s.set_active_case(Some(case_id)))
    }

    /// Resolve every entity linked to a case and merge them into the graph.
    ///
    /// Resolution runs concurrently and is all-or-nothing: if any lookup
    /// fails, nothing is merged and one error toast is queued.
    pub async fn load_case_entities(&self, case_id: &str) -> Result<CaseLoad> {
        match self.resolve_case_entities(case_id).await {
            Ok(entities) => {
                let resolved = entities.len();
                let merged = self.workspace.update(|s| {
                    let merged = s.merge_graph_data(GraphData::from_nodes(entities));
                    s.push_toast(
                        format!("Loaded {} entities from case", resolved),
                        ToastKind::Success,
                    );
                    merged
                });
                info!(
                    "Loaded case {}: {} entities, {} new",
                    case_id, resolved, merged.added_nodes
                );
                Ok(CaseLoad {
                    case_id: case_id.to_string(),
                    resolved,
                    merged,
                })
            }
            Err(e) => {
                error!("Failed to load entities for case {}: {}", case_id, e);
                self.workspace.push_toast(CASE_LOAD_FAILED, ToastKind::Error);
                Err(e)
            }
        }
    }

    async fn resolve_case_entities(&self, case_id: &str) -> Result<Vec<Entity>> {
        let links = self.api.case_entities(case_id).await?;
        debug!("Case {} links {} entities", case_id, links.len());
        try_join_all(
            links
                .iter()
                .map(|link| self.api.get_entity(&link.entity_type, &link.entity_id)),
        )
        .await
    }

    /// Link the focal entity to the active case.
    pub async fn add_selected_to_active_case(&self, notes: Option<String>) -> Result<CaseEntityRef> {
        let target = self.workspace.read(|s| {
            let entity = s.selected()?;
            let case = s.active_case()?;
            Some((entity.clone(), case.id.clone(), case.name.clone()))
        });
        let Some((entity, case_id, case_name)) = target else {
            self.workspace.push_toast(
                "Select an entity and an active case first.",
                ToastKind::Warning,
            );
            return Err(Error::InvalidInput(
                "an entity selection and an active case are required".into(),
            ));
        };

        let link = CaseEntityRef {
            entity_id: entity.id.clone(),
            entity_type: entity.entity_type.clone(),
            notes,
        };
        match self.api.add_entity_to_case(&case_id, &link).await {
            Ok(()) => {
                info!("Linked {} {} to case {}", link.entity_type, link.entity_id, case_id);
                self.workspace.push_toast(
                    format!("Added {} to {}", entity.display_name(), case_name),
                    ToastKind::Success,
                );
                Ok(link)
            }
            Err(e) => {
                error!("Failed to link {} to case {}: {}", link.entity_id, case_id, e);
                self.workspace.push_toast(CASE_LINK_FAILED, ToastKind::Error);
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------
    // Analytics panes
    // ---------------------------------------------------------------

    /// Fetch one pane for the current selection. The response is applied
    /// only if the selection is unchanged when it arrives.
    pub async fn fetch_pane(&self, kind: PaneKind) -> Result<FetchOutcome> {
        let request = self.workspace.update(|s| {
            let ticket = s.begin_load(kind)?;
            let key = match kind {
                PaneKind::Contacts => s.selected()?.phone_key(),
                PaneKind::MoneyTrail => s.selected()?.account_key(),
                _ => ticket.entity_id.clone(),
            };
            Some((ticket, key))
        });
        let Some((ticket, key)) = request else {
            debug!("Skipping {:?} fetch: no matching selection", kind);
            return Ok(FetchOutcome::Skipped);
        };

        match self.request_pane(kind, &ticket, &key).await {
            Ok(payload) => {
                let outcome: FetchOutcome =
                    self.workspace.update(|s| s.finish_load(&ticket, payload)).into();
                debug!("{:?} for {}: {:?}", kind, ticket.entity_id, outcome);
                Ok(outcome)
            }
            Err(e) => {
                warn!("{:?} fetch failed for {}: {}", kind, ticket.entity_id, e);
                self.workspace.update(|s| s.fail_load(&ticket, kind));
                Err(e)
            }
        }
    }

    async fn request_pane(
        &self,
        kind: PaneKind,
        ticket: &SelectionTicket,
        key: &str,
    ) -> Result<AnalyticsPayload> {
        let (entity_type, id) = (ticket.entity_type.as_str(), ticket.entity_id.as_str());
        Ok(match kind {
            PaneKind::Timeline => AnalyticsPayload::Timeline(self.api.timeline(entity_type, id).await?),
            PaneKind::Sightings => {
                AnalyticsPayload::Sightings(self.api.sightings(entity_type, id).await?)
            }
            PaneKind::Contacts => AnalyticsPayload::Contacts(self.api.top_contacts(key).await?),
            PaneKind::MoneyTrail => {
                AnalyticsPayload::MoneyTrail(self.api.trace_money(key, self.trace_depth).await?)
            }
            PaneKind::Mentions => AnalyticsPayload::Mentions(self.api.mentions(id).await?),
        })
    }

    pub async fn fetch_timeline(&self) -> Result<FetchOutcome> {
        self.fetch_pane(PaneKind::Timeline).await
    }

    pub async fn fetch_sightings(&self) -> Result<FetchOutcome> {
        self.fetch_pane(PaneKind::Sightings).await
    }

    pub async fn fetch_contacts(&self) -> Result<FetchOutcome> {
        self.fetch_pane(PaneKind::Contacts).await
    }

    pub async fn fetch_money_trail(&self) -> Result<FetchOutcome> {
        self.fetch_pane(PaneKind::MoneyTrail).await
    }

    pub async fn fetch_mentions(&self) -> Result<FetchOutcome> {
        self.fetch_pane(PaneKind::Mentions).await
    }

    /// Switch the visualization and load its pane for the current selection.
    pub async fn show_view(&self, mode: ViewMode) -> Result<FetchOutcome> {
        self.workspace.set_view_mode(mode);
        match PaneKind::for_view(mode) {
            Some(kind) => self.fetch_pane(kind).await,
            None => Ok(FetchOutcome::Skipped),
        }
    }

    /// Fetch every pane for the current selection concurrently.
    pub async fn refresh_analytics(&self) -> Vec<PaneRefresh> {
        let kinds = PaneKind::all();
        let outcomes = join_all(kinds.iter().map(|kind| self.fetch_pane(*kind))).await;
        kinds
            .iter()
            .zip(outcomes)
            .map(|(kind, outcome)| PaneRefresh {
                kind: *kind,
                outcome,
            })
            .collect()
    }

    /// Keep the visible view and the mentions pane in step with the
    /// selection: every selection change triggers a refetch for it.
    pub fn spawn_selection_follower(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut rx = this.workspace.subscribe_selection();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let ticket = rx.borrow_and_update().clone();
                let Some(ticket) = ticket else {
                    continue;
                };
                debug!("Selection moved to {} (generation {})", ticket.entity_id, ticket.generation);

                let mode = this.workspace.read(|s| s.view_mode());
                let mut kinds = vec![PaneKind::Mentions];
                kinds.extend(PaneKind::for_view(mode));
                for kind in kinds {
                    if let Err(e) = this.fetch_pane(kind).await {
                        debug!("Follow-up {:?} fetch failed: {}", kind, e);
                    }
                }
            }
        })
    }

    // ---------------------------------------------------------------
    // Audit and documents
    // ---------------------------------------------------------------

    pub async fn refresh_audit_logs(&self) -> Result<usize> {
        let logs = self.api.audit_logs().await.map_err(|e| {
            error!("Failed to fetch audit logs: {}", e);
            e
        })?;
        let count = logs.len();
        self.workspace.update(|s| s.set_audit_logs(logs));
        Ok(count)
    }

    /// Audit entries matching `needle`, from the last refresh.
    pub fn filtered_audit_logs(&self, needle: &str) -> Vec<AuditLogEntry> {
        self.workspace.read(|s| {
            gotham_protocol::filter_logs(s.audit_logs(), needle)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Document> {
        self.api.get_document(document_id).await
    }

    pub async fn search_documents(&self, query: &str) -> Result<Vec<Document>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.api.search_documents(query).await
    }
}
