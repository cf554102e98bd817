//! Plain-text rendering of workspace views.
//!
//! Everything that can carry PII goes through the masking policy with the
//! session role before it is printed.

use std::fmt::Write;

use gotham_core::{AuditLogEntry, Case, Document, Entity, Role, SearchResult};
use gotham_protocol::{mask, mask_property, masked_properties};
use gotham_store::{AnalyticsPanes, GraphStats, PaneKind, Toast};

/// Display name of an entity, masked with the key it was taken from.
pub fn entity_label(entity: &Entity, role: Role) -> String {
    ["full_name", "msisdn", "name"]
        .iter()
        .find_map(|key| entity.text_property(key).map(|v| mask(&v, key, role)))
        .unwrap_or_else(|| entity.id.clone())
}

/// Search hit label. The backend's display name is masked when it is the
/// value of a sensitive property.
fn result_label(result: &SearchResult, role: Role) -> String {
    result
        .properties
        .iter()
        .find(|(_, value)| value.to_string() == result.display_name)
        .map(|(key, _)| mask(&result.display_name, key, role))
        .unwrap_or_else(|| result.display_name.clone())
}

pub fn render_entity(entity: &Entity, role: Role) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} [{}] {}",
        entity_label(entity, role),
        entity.entity_type,
        entity.id
    );
    if let Some(flag) = &entity.risk_flag {
        let _ = writeln!(out, "  risk: {}", flag);
    }

    let properties = masked_properties(entity, role);
    if !properties.is_empty() {
        let width = properties.iter().map(|p| p.label.len()).max().unwrap_or(0);
        let _ = writeln!(out, "  properties:");
        for p in &properties {
            let _ = writeln!(out, "    {:<width$}  {}", p.label, p.value, width = width);
        }
    }

    let provenance = entity.provenance();
    let _ = writeln!(out, "  provenance:");
    let _ = writeln!(
        out,
        "    source    {}",
        provenance.source.as_deref().unwrap_or("Unknown")
    );
    if let Some(ts) = provenance.ingested_at {
        let _ = writeln!(out, "    ingested  {}", ts.to_rfc3339());
    }
    out
}

pub fn render_search_results(results: &[SearchResult], role: Role) -> String {
    if results.is_empty() {
        return "No results.\n".to_string();
    }
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} [{}] {}",
            i + 1,
            result_label(result, role),
            result.entity_type,
            result.id
        );
    }
    out
}

pub fn render_graph_stats(stats: &GraphStats) -> String {
    format!(
        "Workspace: {} nodes, {} edges\n",
        stats.node_count, stats.edge_count
    )
}

/// One analytics pane. Phone numbers and account ids are masked under
/// their property names.
pub fn render_pane(panes: &AnalyticsPanes, kind: PaneKind, role: Role) -> String {
    let mut out = String::new();
    if !panes.is_loaded(kind) {
        let _ = writeln!(out, "No data.");
        return out;
    }
    match kind {
        PaneKind::Timeline => {
            for event in panes.timeline.items() {
                let _ = writeln!(
                    out,
                    "{}  {:<12} {}",
                    event.timestamp, event.event_type, event.description
                );
            }
        }
        PaneKind::Sightings => {
            for s in panes.sightings.items() {
                let _ = writeln!(
                    out,
                    "{}  {:>9.4}, {:>9.4}  {}",
                    s.timestamp, s.latitude, s.longitude, s.location_name
                );
            }
        }
        PaneKind::Contacts => {
            for c in panes.contacts.items() {
                let _ = write!(out, "{:<16} {:>4}", mask(&c.phone, "phone", role), c.count);
                if let (Some(calls), Some(messages)) = (c.calls, c.messages) {
                    let _ = write!(out, "  ({} calls, {} messages)", calls, messages);
                }
                out.push('\n');
            }
        }
        PaneKind::MoneyTrail => {
            for (hop, step) in panes.money_trail.items().iter().zip(1..) {
                let _ = writeln!(
                    out,
                    "{:>2}. {:<20} {:>14.2}",
                    step,
                    mask(&hop.account_id, "account_id", role),
                    hop.amount
                );
            }
        }
        PaneKind::Mentions => {
            for m in panes.mentions.items() {
                let _ = writeln!(out, "{} [{}] {}", m.document_id, m.classification, m.mention);
                if let Some(handler) = &m.handled_by {
                    let _ = writeln!(out, "    handled by {}", handler);
                }
            }
        }
    }
    if out.is_empty() {
        out.push_str("No data.\n");
    }
    out
}

pub fn render_cases(cases: &[Case], active: Option<&str>) -> String {
    if cases.is_empty() {
        return "No cases.\n".to_string();
    }
    let mut out = String::new();
    for case in cases {
        let marker = if Some(case.id.as_str()) == active { "*" } else { " " };
        let _ = writeln!(
            out,
            "{} {:<12} {:<24} {:<9} {}",
            marker,
            case.id,
            case.name,
            case.status.to_string(),
            case.created_at
                .map(|ts| ts.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        if !case.description.is_empty() {
            let _ = writeln!(out, "    {}", case.description);
        }
    }
    out
}

pub fn render_audit_logs(logs: &[AuditLogEntry]) -> String {
    if logs.is_empty() {
        return "No matching audit records found.\n".to_string();
    }
    let mut out = String::new();
    for log in logs {
        let target = match (&log.entity_type, &log.entity_id) {
            (Some(ty), Some(id)) => format!("{} {}", ty, id),
            (None, Some(id)) => id.clone(),
            _ => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{}  {:<14} {:<20} {}",
            log.timestamp, log.user_id, log.action, target
        );
    }
    out
}

pub fn render_document(document: &Document, role: Role) -> String {
    let mut out = String::new();
    for (key, value) in document {
        let _ = writeln!(out, "{:<16} {}", key, mask_property(value, key, role));
    }
    out
}

pub fn render_toasts(toasts: &[Toast]) -> String {
    let mut out = String::new();
    for toast in toasts {
        let _ = writeln!(out, "[{}] {}", toast.kind, toast.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotham_core::{ContactFrequency, MoneyHop, PropertyValue};
    use gotham_store::{AnalyticsPayload, InvestigationState};

    fn phone() -> Entity {
        Entity::new("PH1", "Phone")
            .with_property("msisdn", "447700900123")
            .with_property("carrier", "Vodafone")
            .with_property("_source", "telco-feed")
            .with_risk_flag("HIGH")
    }

    #[test]
    fn test_entity_masked_for_analyst() {
        let text = render_entity(&phone(), Role::Analyst);
        assert!(text.starts_with("****0123 [Phone] PH1"));
        assert!(text.contains("risk: HIGH"));
        assert!(text.contains("carrier"));
        assert!(text.contains("Vodafone"));
        assert!(!text.contains("447700900123"));
        assert!(text.contains("source    telco-feed"));
    }

    #[test]
    fn test_entity_revealed_for_investigator() {
        let text = render_entity(&phone(), Role::Investigator);
        assert!(text.starts_with("447700900123 [Phone] PH1"));
    }

    #[test]
    fn test_missing_source_shows_unknown() {
        let entity = Entity::new("P1", "Person").with_property("full_name", "Ayaan Shah");
        let text = render_entity(&entity, Role::Analyst);
        assert!(text.contains("source    Unknown"));
        assert!(text.contains("Ayaan Shah [Person] P1"));
    }

    #[test]
    fn test_search_label_masks_sensitive_display_name() {
        let mut properties = gotham_core::Properties::new();
        properties.insert("msisdn".into(), PropertyValue::from("447700900123"));
        let results = vec![SearchResult {
            id: "PH1".into(),
            entity_type: "Phone".into(),
            display_name: "447700900123".into(),
            properties,
        }];
        let text = render_search_results(&results, Role::Analyst);
        assert!(text.contains("****0123 [Phone] PH1"));
        assert_eq!(render_search_results(&[], Role::Analyst), "No results.\n");
    }

    #[test]
    fn test_pane_rendering_masks_identifiers() {
        let mut state = InvestigationState::default();
        state.select_entity(Some(phone()));
        let ticket = state.begin_load(PaneKind::Contacts).unwrap();
        state.finish_load(
            &ticket,
            AnalyticsPayload::Contacts(vec![ContactFrequency {
                phone: "447700900999".into(),
                count: 12,
                calls: Some(10),
                messages: Some(2),
            }]),
        );

        let text = render_pane(state.panes(), PaneKind::Contacts, Role::Analyst);
        assert!(text.contains("****0999"));
        assert!(text.contains("(10 calls, 2 messages)"));
        assert_eq!(
            render_pane(state.panes(), PaneKind::Timeline, Role::Analyst),
            "No data.\n"
        );
    }

    #[test]
    fn test_money_trail_numbering() {
        let mut state = InvestigationState::default();
        state.select_entity(Some(Entity::new("AC1", "Account")));
        let ticket = state.begin_load(PaneKind::MoneyTrail).unwrap();
        state.finish_load(
            &ticket,
            AnalyticsPayload::MoneyTrail(vec![MoneyHop {
                account_id: "GB00-1234".into(),
                amount: 5000.0,
            }]),
        );
        let text = render_pane(state.panes(), PaneKind::MoneyTrail, Role::Investigator);
        assert!(text.contains(" 1. GB00-1234"));
        assert!(text.contains("5000.00"));
    }
}
