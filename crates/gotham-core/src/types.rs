//! Wire and domain types: entities, relationships, cases, analytics payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Well-known entity type tags. The set is open; these are the ones the
/// views key off.
pub mod entity_types {
    pub const PERSON: &str = "Person";
    pub const PHONE: &str = "Phone";
    pub const ACCOUNT: &str = "Account";
    pub const LOCATION: &str = "Location";
}

/// Property keys prefixed with this are provenance metadata.
pub const PROVENANCE_PREFIX: char = '_';

/// Deserialize `null` or a missing field as the type's default.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|ts| ts.and_utc()))
        .ok()
}

/// Deserialize an optional timestamp. Missing, null, non-string or
/// unparseable values become `None` instead of failing the whole record.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_str).and_then(parse_timestamp))
}

// ---------------------------------------------------------------
// Property values
// ---------------------------------------------------------------

/// A scalar property value. Non-scalar JSON is flattened to its text form
/// when decoded, so every property renders as a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl PropertyValue {
    /// Convert a raw JSON value into a scalar property.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => match parse_timestamp(&s) {
                Some(ts) => Self::Timestamp(ts),
                None => Self::Text(s),
            },
            other => Self::Text(other.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Null and empty text count as empty (falsy) for display fallbacks.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => {
                serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

/// Property bag attached to entities and relationships. Keeps the order
/// the backend sent the keys in.
pub type Properties = IndexMap<String, PropertyValue>;

// ---------------------------------------------------------------
// Graph elements
// ---------------------------------------------------------------

/// An investigative subject: person, phone, account, location, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_flag: Option<String>,
}

/// Where an entity came from, read from its underscore-prefixed properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub source: Option<String>,
    pub ingested_at: Option<DateTime<Utc>>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            properties: Properties::new(),
            risk_flag: None,
        }
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_risk_flag(mut self, flag: impl Into<String>) -> Self {
        self.risk_flag = Some(flag.into());
        self
    }

    pub fn is_type(&self, entity_type: &str) -> bool {
        self.entity_type == entity_type
    }

    /// Property rendered as text, `None` when absent or empty.
    pub fn text_property(&self, key: &str) -> Option<String> {
        self.properties
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// Label used in lists and headers: full name, phone number or name,
    /// falling back to the id.
    pub fn display_name(&self) -> String {
        ["full_name", "msisdn", "name"]
            .iter()
            .find_map(|key| self.text_property(key))
            .unwrap_or_else(|| self.id.clone())
    }

    /// Properties shown in the generic listing (provenance keys excluded).
    pub fn visible_properties(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.properties
            .iter()
            .filter(|(key, _)| !key.starts_with(PROVENANCE_PREFIX))
    }

    pub fn provenance(&self) -> Provenance {
        Provenance {
            source: self.text_property("_source"),
            ingested_at: self
                .properties
                .get("_ingested_at")
                .and_then(PropertyValue::as_timestamp),
        }
    }

    /// Identifier used by the communications analytics (msisdn, else id).
    pub fn phone_key(&self) -> String {
        self.text_property("msisdn").unwrap_or_else(|| self.id.clone())
    }

    /// Identifier used by the money-flow trace (account_id, else id).
    pub fn account_key(&self) -> String {
        self.text_property("account_id").unwrap_or_else(|| self.id.clone())
    }
}

/// A directed, typed edge between two entity ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Properties,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
            properties: Properties::new(),
        }
    }
}

/// A batch of graph elements returned by search, expand and case loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: Vec<Entity>,
    #[serde(default, deserialize_with = "nullable")]
    pub edges: Vec<Relationship>,
}

impl GraphData {
    pub fn from_nodes(nodes: Vec<Entity>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

// ---------------------------------------------------------------
// Cases
// ---------------------------------------------------------------

/// Investigation case status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CaseStatus {
    #[default]
    Open,
    Closed,
    Archived,
    Unknown,
}

impl From<String> for CaseStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            "archived" => Self::Archived,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Archived => write!(f, "archived"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A backend-persisted grouping of entities under investigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: CaseStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /cases/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCase {
    pub name: String,
    pub description: String,
    pub user_id: String,
}

/// Link between a case and an entity (`/cases/{id}/entities`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEntityRef {
    pub entity_id: String,
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------
// Search, analytics, documents, audit
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub display_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub event_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    #[serde(default, deserialize_with = "nullable")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub location_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactFrequency {
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable")]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<u64>,
}

/// One hop of a traced money flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyHop {
    #[serde(rename = "accountId", default, deserialize_with = "nullable")]
    pub account_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMention {
    #[serde(default, deserialize_with = "nullable")]
    pub document_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub classification: String,
    #[serde(default, deserialize_with = "nullable")]
    pub mention: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<String>,
}

/// A document record; the backend returns an untyped property bag.
pub type Document = Properties;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default, deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: String,
}

// ---------------------------------------------------------------
// Roles
// ---------------------------------------------------------------

/// Active user role. Only investigators see unmasked PII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Analyst,
    Investigator,
}

impl Role {
    pub fn reveals_pii(&self) -> bool {
        matches!(self, Role::Investigator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyst => write!(f, "analyst"),
            Self::Investigator => write!(f, "investigator"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analyst" => Ok(Self::Analyst),
            "investigator" => Ok(Self::Investigator),
            other => Err(Error::InvalidInput(format!("unknown role: {}", other))),
        }
    }
}
