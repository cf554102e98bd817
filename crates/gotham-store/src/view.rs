//! Visualization mode and top-level navigation section.

use std::fmt;
use std::str::FromStr;

use gotham_core::{entity_types, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Graph,
    Timeline,
    Map,
    Comms,
    Finance,
}

impl ViewMode {
    pub fn all() -> &'static [ViewMode] {
        &[
            Self::Graph,
            Self::Timeline,
            Self::Map,
            Self::Comms,
            Self::Finance,
        ]
    }

    /// Entity type the view needs as its focal entity, if restricted.
    pub fn required_entity_type(&self) -> Option<&'static str> {
        match self {
            Self::Comms => Some(entity_types::PHONE),
            Self::Finance => Some(entity_types::ACCOUNT),
            _ => None,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph => write!(f, "graph"),
            Self::Timeline => write!(f, "timeline"),
            Self::Map => write!(f, "map"),
            Self::Comms => write!(f, "comms"),
            Self::Finance => write!(f, "finance"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| Error::InvalidInput(format!("unknown view mode: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    /// Knowledge-graph workspace.
    #[default]
    Knowledge,
    Cases,
    Audit,
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Knowledge => write!(f, "knowledge"),
            Self::Cases => write!(f, "cases"),
            Self::Audit => write!(f, "audit"),
        }
    }
}

impl FromStr for Navigation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knowledge" => Ok(Self::Knowledge),
            "cases" => Ok(Self::Cases),
            "audit" => Ok(Self::Audit),
            other => Err(Error::InvalidInput(format!("unknown section: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_entity_types() {
        assert_eq!(ViewMode::Comms.required_entity_type(), Some("Phone"));
        assert_eq!(ViewMode::Finance.required_entity_type(), Some("Account"));
        assert_eq!(ViewMode::Map.required_entity_type(), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Finance".parse::<ViewMode>().unwrap(), ViewMode::Finance);
        assert!("table".parse::<ViewMode>().is_err());
        assert_eq!("audit".parse::<Navigation>().unwrap(), Navigation::Audit);
    }
}
