//! Persona registry
//!
//! One accessor per known persona. Each call hands out a fresh record;
//! adding a persona means adding a `PersonaKind`, its JSON entry and an
//! accessor here.

use crate::models::{PersonaConfig, PersonaKind};
use crate::prompts::PromptLibrary;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    library: Arc<PromptLibrary>,
}

impl PersonaRegistry {
    pub fn new(library: Arc<PromptLibrary>) -> Self {
        Self { library }
    }

    pub fn financial_analyst(&self) -> Arc<PersonaConfig> {
        self.get(PersonaKind::FinancialAnalyst)
    }

    pub fn risk_assessor(&self) -> Arc<PersonaConfig> {
        self.get(PersonaKind::RiskAssessor)
    }

    pub fn budget_planner(&self) -> Arc<PersonaConfig> {
        self.get(PersonaKind::BudgetPlanner)
    }

    pub fn investment_advisor(&self) -> Arc<PersonaConfig> {
        self.get(PersonaKind::InvestmentAdvisor)
    }

    pub fn get(&self, kind: PersonaKind) -> Arc<PersonaConfig> {
        Arc::new(self.library.persona(kind).clone())
    }

    /// All personas in declaration order
    pub fn list(&self) -> Vec<(PersonaKind, Arc<PersonaConfig>)> {
        PersonaKind::ALL
            .iter()
            .map(|kind| (*kind, self.get(*kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry() -> PersonaRegistry {
        PersonaRegistry::new(Arc::new(PromptLibrary::bundled().unwrap()))
    }

    #[test]
    fn test_all_personas_populated() {
        let registry = registry();
        let personas = [
            registry.financial_analyst(),
            registry.risk_assessor(),
            registry.budget_planner(),
            registry.investment_advisor(),
        ];

        for persona in &personas {
            assert!(!persona.role.is_empty());
            assert!(!persona.goal.is_empty());
            assert!(!persona.backstory.is_empty());
        }

        let roles: HashSet<_> = personas.iter().map(|p| p.role.as_str()).collect();
        assert_eq!(roles.len(), 4);
    }

    #[test]
    fn test_accessor_returns_fresh_record() {
        let registry = registry();
        let first = registry.financial_analyst();
        let second = registry.financial_analyst();

        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_known_roles() {
        let registry = registry();
        assert_eq!(registry.financial_analyst().role, "Financial Analyst");
        assert_eq!(registry.risk_assessor().role, "Risk Assessment Specialist");
        assert_eq!(registry.budget_planner().role, "Budget Planning Advisor");
        assert_eq!(registry.investment_advisor().role, "Investment Advisor");
        assert_eq!(registry.list().len(), 4);
    }
}
