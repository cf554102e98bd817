//! Notification queue: transient user-facing notices.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound keeping the TTL inside chrono's representable range.
const MAX_TTL_SECS: u64 = i64::MAX as u64 / 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub created_at: DateTime<Utc>,
}

/// FIFO queue of notices. Without a TTL every notice stays until dismissed.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    toasts: Vec<Toast>,
    ttl: Option<Duration>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue whose notices expire `ttl_secs` after creation.
    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        Self {
            toasts: Vec::new(),
            ttl: Some(Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64)),
        }
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Append a notice and return its id.
    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind) -> String {
        let id = Uuid::new_v4().simple().to_string()[..12].to_string();
        self.toasts.push(Toast {
            id: id.clone(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
        });
        id
    }

    /// Remove the notice with `id`. Returns false if it was not queued.
    pub fn dismiss(&mut self, id: &str) -> bool {
        match self.toasts.iter().position(|t| t.id == id) {
            Some(pos) => {
                self.toasts.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Drop notices older than the TTL as of `now`. Returns how many went.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.toasts.len();
        self.toasts.retain(|t| now - t.created_at < ttl);
        before - self.toasts.len()
    }

    /// Remove and return every queued notice.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }
}
