//! Selection-keyed analytics panes.
//!
//! Every pane belongs to the selection generation it was loaded for. A
//! response is applied only if the selection has not changed since the
//! request went out; otherwise it is reported stale and dropped.

use gotham_core::{
    entity_types, ContactFrequency, DocumentMention, MoneyHop, Sighting, TimelineEvent,
};
use serde::{Deserialize, Serialize};

use crate::view::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneKind {
    Timeline,
    Sightings,
    Contacts,
    MoneyTrail,
    Mentions,
}

impl PaneKind {
    pub fn all() -> &'static [PaneKind] {
        &[
            Self::Timeline,
            Self::Sightings,
            Self::Contacts,
            Self::MoneyTrail,
            Self::Mentions,
        ]
    }

    pub fn required_entity_type(&self) -> Option<&'static str> {
        match self {
            Self::Contacts => Some(entity_types::PHONE),
            Self::MoneyTrail => Some(entity_types::ACCOUNT),
            _ => None,
        }
    }

    /// The pane a visualization mode displays. The graph view has none.
    pub fn for_view(mode: ViewMode) -> Option<PaneKind> {
        match mode {
            ViewMode::Graph => None,
            ViewMode::Timeline => Some(Self::Timeline),
            ViewMode::Map => Some(Self::Sightings),
            ViewMode::Comms => Some(Self::Contacts),
            ViewMode::Finance => Some(Self::MoneyTrail),
        }
    }
}

/// Identity of the focal entity at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionTicket {
    pub generation: u64,
    pub entity_id: String,
    pub entity_type: String,
}

/// One view's data for one selection generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Pane<T> {
    pub generation: u64,
    pub loading: bool,
    /// `None` until a response has been applied; `Some(vec![])` is a valid
    /// empty result.
    pub data: Option<Vec<T>>,
}

impl<T> Default for Pane<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            loading: false,
            data: None,
        }
    }
}

impl<T> Pane<T> {
    fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.loading = false;
        self.data = None;
    }

    fn fill(&mut self, data: Vec<T>) -> usize {
        let len = data.len();
        self.loading = false;
        self.data = Some(data);
        len
    }

    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

/// A response destined for one pane.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsPayload {
    Timeline(Vec<TimelineEvent>),
    Sightings(Vec<Sighting>),
    Contacts(Vec<ContactFrequency>),
    MoneyTrail(Vec<MoneyHop>),
    Mentions(Vec<DocumentMention>),
}

impl AnalyticsPayload {
    pub fn kind(&self) -> PaneKind {
        match self {
            Self::Timeline(_) => PaneKind::Timeline,
            Self::Sightings(_) => PaneKind::Sightings,
            Self::Contacts(_) => PaneKind::Contacts,
            Self::MoneyTrail(_) => PaneKind::MoneyTrail,
            Self::Mentions(_) => PaneKind::Mentions,
        }
    }
}

/// Result of offering a response to the panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneUpdate {
    /// Applied; carries the number of items.
    Applied(usize),
    /// The selection moved on; nothing changed.
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsPanes {
    pub timeline: Pane<TimelineEvent>,
    pub sightings: Pane<Sighting>,
    pub contacts: Pane<ContactFrequency>,
    pub money_trail: Pane<MoneyHop>,
    pub mentions: Pane<DocumentMention>,
}

impl AnalyticsPanes {
    pub(crate) fn reset(&mut self, generation: u64) {
        self.timeline.reset(generation);
        self.sightings.reset(generation);
        self.contacts.reset(generation);
        self.money_trail.reset(generation);
        self.mentions.reset(generation);
    }

    pub(crate) fn set_loading(&mut self, kind: PaneKind, loading: bool) {
        match kind {
            PaneKind::Timeline => self.timeline.loading = loading,
            PaneKind::Sightings => self.sightings.loading = loading,
            PaneKind::Contacts => self.contacts.loading = loading,
            PaneKind::MoneyTrail => self.money_trail.loading = loading,
            PaneKind::Mentions => self.mentions.loading = loading,
        }
    }

    pub(crate) fn fill(&mut self, payload: AnalyticsPayload) -> usize {
        match payload {
            AnalyticsPayload::Timeline(data) => self.timeline.fill(data),
            AnalyticsPayload::Sightings(data) => self.sightings.fill(data),
            AnalyticsPayload::Contacts(data) => self.contacts.fill(data),
            AnalyticsPayload::MoneyTrail(data) => self.money_trail.fill(data),
            AnalyticsPayload::Mentions(data) => self.mentions.fill(data),
        }
    }

    pub fn is_loading(&self, kind: PaneKind) -> bool {
        match kind {
            PaneKind::Timeline => self.timeline.loading,
            PaneKind::Sightings => self.sightings.loading,
            PaneKind::Contacts => self.contacts.loading,
            PaneKind::MoneyTrail => self.money_trail.loading,
            PaneKind::Mentions => self.mentions.loading,
        }
    }

    pub fn is_loaded(&self, kind: PaneKind) -> bool {
        match kind {
            PaneKind::Timeline => self.timeline.is_loaded(),
            PaneKind::Sightings => self.sightings.is_loaded(),
            PaneKind::Contacts => self.contacts.is_loaded(),
            PaneKind::MoneyTrail => self.money_trail.is_loaded(),
            PaneKind::Mentions => self.mentions.is_loaded(),
        }
    }
}
