//! reqwest implementation of `InvestigationApi`.

use std::time::Duration;

use async_trait::async_trait;
use gotham_core::{
    AuditLogEntry, Case, CaseEntityRef, ContactFrequency, Document, DocumentMention, Entity,
    Error, GothamConfig, GraphData, MoneyHop, NewCase, Result, SearchResult, Sighting,
    TimelineEvent,
};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::InvestigationApi;

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base URL {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API base URL cannot carry a path: {}",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base })
    }

    pub fn from_config(config: &GothamConfig) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL extended with `segments`, each percent-encoded. An empty
    /// final segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_query(mut url: Url, pairs: &[(&str, &str)]) -> Url {
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Transport(format!("GET {} failed: {}", url, e)))?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<Response> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("POST {} failed: {}", url, e)))?;
        Self::check_status(response).await
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body);
        warn!("{} returned {}: {}", url, status, message);

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("{}: {}", url.path(), message)));
        }
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// Insert responses come back either as the row itself or as a
/// representation array holding the inserted row.
#[derive(Deserialize)]
#[serde(untagged)]
enum Inserted<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Inserted<T> {
    fn into_first(self) -> Result<T> {
        match self {
            Self::One(row) => Ok(row),
            Self::Many(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| Error::Decode("insert returned no rows".to_string())),
        }
    }
}

/// Pull the `detail` field out of a JSON error body, else use the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl InvestigationApi for ApiClient {
    async fn get_entity(&self, entity_type: &str, id: &str) -> Result<Entity> {
        self.get_json(self.endpoint(&["entities", entity_type, id]))
            .await
    }

    async fn expand_entity(&self, entity_type: &str, id: &str, depth: u32) -> Result<GraphData> {
        let url = Self::with_query(
            self.endpoint(&["entities", entity_type, id, "expand"]),
            &[("depth", depth.to_string().as_str())],
        );
        self.get_json(url).await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = Self::with_query(self.endpoint(&["search", ""]), &[("q", query)]);
        self.get_json(url).await
    }

    async fn search_by_type(&self, entity_type: &str, query: &str) -> Result<Vec<SearchResult>> {
        let url = Self::with_query(
            self.endpoint(&["search", "type", entity_type]),
            &[("q", query)],
        );
        self.get_json(url).await
    }

    async fn timeline(&self, entity_type: &str, id: &str) -> Result<Vec<TimelineEvent>> {
        self.get_json(self.endpoint(&["analytics", "timeline", entity_type, id]))
            .await
    }

    async fn sightings(&self, entity_type: &str, id: &str) -> Result<Vec<Sighting>> {
        self.get_json(self.endpoint(&["analytics", "geo", "sightings", entity_type, id]))
            .await
    }

    async fn top_contacts(&self, phone_id: &str) -> Result<Vec<ContactFrequency>> {
        self.get_json(self.endpoint(&["analytics", "comms", "frequent", phone_id]))
            .await
    }

    async fn trace_money(&self, account_id: &str, depth: u32) -> Result<Vec<MoneyHop>> {
        let url = Self::with_query(
            self.endpoint(&["analytics", "finance", "trace", account_id]),
            &[("depth", depth.to_string().as_str())],
        );
        self.get_json(url).await
    }

    async fn list_cases(&self) -> Result<Vec<Case>> {
        self.get_json(self.endpoint(&["cases", ""])).await
    }

    async fn get_case(&self, case_id: &str) -> Result<Case> {
        self.get_json(self.endpoint(&["cases", case_id])).await
    }

    async fn create_case(&self, case: &NewCase) -> Result<Case> {
        let response = self.post_json(self.endpoint(&["cases", ""]), case).await?;
        Self::decode::<Inserted<Case>>(response).await?.into_first()
    }

    async fn case_entities(&self, case_id: &str) -> Result<Vec<CaseEntityRef>> {
        self.get_json(self.endpoint(&["cases", case_id, "entities"]))
            .await
    }

    async fn add_entity_to_case(&self, case_id: &str, link: &CaseEntityRef) -> Result<()> {
        // The response body is the backend's link record; only the status matters.
        self.post_json(self.endpoint(&["cases", case_id, "entities"]), link)
            .await?;
        Ok(())
    }

    async fn get_document(&self, document_id: &str) -> Result<Document> {
        self.get_json(self.endpoint(&["documents", document_id]))
            .await
    }

    async fn mentions(&self, id: &str) -> Result<Vec<DocumentMention>> {
        self.get_json(self.endpoint(&["documents", id, "mentions"]))
            .await
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<Document>> {
        let url = Self::with_query(self.endpoint(&["documents", "search"]), &[("q", query)]);
        self.get_json(url).await
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>> {
        self.get_json(self.endpoint(&["audit-logs"])).await
    }
}
