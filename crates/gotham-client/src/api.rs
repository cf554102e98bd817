//! Call contract of the investigation backend.

use async_trait::async_trait;
use gotham_core::{
    AuditLogEntry, Case, CaseEntityRef, ContactFrequency, Document, DocumentMention, Entity,
    GraphData, MoneyHop, NewCase, Result, SearchResult, Sighting, TimelineEvent,
};

/// Every remote call the client makes. `ApiClient` implements it over HTTP;
/// tests substitute in-memory fakes.
#[async_trait]
pub trait InvestigationApi: Send + Sync {
    // Entities
    async fn get_entity(&self, entity_type: &str, id: &str) -> Result<Entity>;
    async fn expand_entity(&self, entity_type: &str, id: &str, depth: u32) -> Result<GraphData>;

    // Search
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
    async fn search_by_type(&self, entity_type: &str, query: &str) -> Result<Vec<SearchResult>>;

    // Analytics
    async fn timeline(&self, entity_type: &str, id: &str) -> Result<Vec<TimelineEvent>>;
    async fn sightings(&self, entity_type: &str, id: &str) -> Result<Vec<Sighting>>;
    async fn top_contacts(&self, phone_id: &str) -> Result<Vec<ContactFrequency>>;
    async fn trace_money(&self, account_id: &str, depth: u32) -> Result<Vec<MoneyHop>>;

    // Cases
    async fn list_cases(&self) -> Result<Vec<Case>>;
    async fn get_case(&self, case_id: &str) -> Result<Case>;
    async fn create_case(&self, case: &NewCase) -> Result<Case>;
    async fn case_entities(&self, case_id: &str) -> Result<Vec<CaseEntityRef>>;
    async fn add_entity_to_case(&self, case_id: &str, link: &CaseEntityRef) -> Result<()>;

    // Documents
    async fn get_document(&self, document_id: &str) -> Result<Document>;
    async fn mentions(&self, id: &str) -> Result<Vec<DocumentMention>>;
    async fn search_documents(&self, query: &str) -> Result<Vec<Document>>;

    // Audit
    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>>;
}
