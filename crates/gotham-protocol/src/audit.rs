//! Audit trail filtering for the audit log viewer.

use gotham_core::AuditLogEntry;

/// Keep entries whose action, entity id or user id contains `needle`
/// (case-insensitive). An empty needle keeps everything.
pub fn filter_logs<'a>(logs: &'a [AuditLogEntry], needle: &str) -> Vec<&'a AuditLogEntry> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return logs.iter().collect();
    }

    logs.iter()
        .filter(|log| {
            log.action.to_lowercase().contains(&needle)
                || log
                    .entity_id
                    .as_deref()
                    .is_some_and(|id| id.to_lowercase().contains(&needle))
                || log.user_id.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, action: &str, entity_id: Option<&str>) -> AuditLogEntry {
        AuditLogEntry {
            user_id: user.into(),
            action: action.into(),
            entity_type: entity_id.map(|_| "Person".to_string()),
            entity_id: entity_id.map(str::to_string),
            timestamp: "2024-06-01T10:00:00Z".into(),
        }
    }

    #[test]
    fn test_filter_matches_action_entity_and_user() {
        let logs = vec![
            entry("u1", "VIEW_ENTITY", Some("P1")),
            entry("u2", "LOGIN", None),
            entry("investigator-7", "EXPORT", Some("AC9")),
        ];

        assert_eq!(filter_logs(&logs, "view").len(), 1);
        assert_eq!(filter_logs(&logs, "ac9")[0].action, "EXPORT");
        assert_eq!(filter_logs(&logs, "INVESTIGATOR")[0].user_id, "investigator-7");
        assert!(filter_logs(&logs, "nothing-matches").is_empty());
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        let logs = vec![entry("u1", "LOGIN", None), entry("u2", "LOGIN", None)];
        assert_eq!(filter_logs(&logs, "  ").len(), 2);
    }
}
