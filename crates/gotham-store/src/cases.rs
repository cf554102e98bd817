//! Read-only projection of the backend's case list plus the active case.

use gotham_core::Case;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct CaseRegistry {
    cases: Vec<Case>,
    active: Option<String>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Replace the known case list. The active pointer survives only if its
    /// case is still listed.
    pub fn set_cases(&mut self, cases: Vec<Case>) {
        self.cases = cases;
        if let Some(active) = &self.active {
            if !self.cases.iter().any(|c| &c.id == active) {
                self.active = None;
            }
        }
    }

    pub fn active_case(&self) -> Option<&Case> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Point the active case at a listed case, or clear it. Unknown ids are
    /// refused and leave the pointer unchanged.
    pub fn set_active(&mut self, case_id: Option<&str>) -> bool {
        match case_id {
            None => {
                self.active = None;
                true
            }
            Some(id) if self.get(id).is_some() => {
                self.active = Some(id.to_string());
                true
            }
            Some(id) => {
                warn!("Refusing to activate unknown case {}", id);
                false
            }
        }
    }

    /// Record a case the backend just created and make it active.
    pub fn add_created(&mut self, case: Case) {
        self.active = Some(case.id.clone());
        self.cases.push(case);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gotham_core::CaseStatus;

    fn case(id: &str) -> Case {
        Case {
            id: id.into(),
            name: format!("OP-{}", id),
            description: String::new(),
            status: CaseStatus::Open,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_add_created_activates() {
        let mut registry = CaseRegistry::new();
        registry.set_cases(vec![case("c1")]);
        registry.add_created(case("c2"));

        assert_eq!(registry.cases().len(), 2);
        assert_eq!(registry.active_case().unwrap().id, "c2");
    }

    #[test]
    fn test_set_active_refuses_unknown() {
        let mut registry = CaseRegistry::new();
        registry.set_cases(vec![case("c1")]);

        assert!(registry.set_active(Some("c1")));
        assert!(!registry.set_active(Some("missing")));
        assert_eq!(registry.active_id(), Some("c1"));

        assert!(registry.set_active(None));
        assert!(registry.active_case().is_none());
    }

    #[test]
    fn test_refresh_drops_stale_active() {
        let mut registry = CaseRegistry::new();
        registry.set_cases(vec![case("c1"), case("c2")]);
        registry.set_active(Some("c2"));

        registry.set_cases(vec![case("c2"), case("c3")]);
        assert_eq!(registry.active_id(), Some("c2"));

        registry.set_cases(vec![case("c3")]);
        assert_eq!(registry.active_id(), None);
    }
}
