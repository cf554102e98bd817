//! Client configuration: JSON file with environment overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Role;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_USER_ID: &str = "analyst-1";
pub const DEFAULT_EXPAND_DEPTH: u32 = 1;
pub const DEFAULT_TRACE_DEPTH: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Top-level Mini Gotham client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GothamConfig {
    /// Base URL of the investigation API, including the version prefix.
    pub api_base_url: String,
    /// User id recorded as the creator of new cases.
    pub user_id: String,
    /// Role the session starts with.
    pub role: Role,
    /// Neighbourhood depth used by network expansion.
    pub expand_depth: u32,
    /// Hop count requested from the money-flow trace.
    pub trace_depth: u32,
    /// Auto-expiry for notifications. `None` keeps them until dismissed.
    pub toast_ttl_secs: Option<u64>,
    pub request_timeout_secs: u64,
}

impl Default for GothamConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            user_id: DEFAULT_USER_ID.into(),
            role: Role::Analyst,
            expand_depth: DEFAULT_EXPAND_DEPTH,
            trace_depth: DEFAULT_TRACE_DEPTH,
            toast_ttl_secs: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GothamConfig {
    /// Load config from file (if it exists), then apply `GOTHAM_*`
    /// environment overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config = Self::from_file(config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        info!(
            "Config loaded: api={}, role={}, user={}",
            config.api_base_url, config.role, config.user_id
        );
        Ok(config)
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn from_file(config_path: &Path) -> Result<Self> {
        match std::fs::read_to_string(config_path) {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                Error::Config(format!("{}: {}", config_path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", config_path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GOTHAM_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(user) = lookup("GOTHAM_USER_ID") {
            self.user_id = user;
        }
        if let Some(role) = lookup("GOTHAM_ROLE") {
            self.role = role.parse()?;
        }
        if let Some(depth) = lookup("GOTHAM_EXPAND_DEPTH") {
            self.expand_depth = parse_number("GOTHAM_EXPAND_DEPTH", &depth)?;
        }
        if let Some(depth) = lookup("GOTHAM_TRACE_DEPTH") {
            self.trace_depth = parse_number("GOTHAM_TRACE_DEPTH", &depth)?;
        }
        if let Some(ttl) = lookup("GOTHAM_TOAST_TTL_SECS") {
            self.toast_ttl_secs = Some(parse_number("GOTHAM_TOAST_TTL_SECS", &ttl)?);
        }
        if let Some(timeout) = lookup("GOTHAM_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("GOTHAM_REQUEST_TIMEOUT_SECS", &timeout)?;
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw)))
}
