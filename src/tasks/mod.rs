//! Task template library
//!
//! One factory per task type. Each binds a persona to a rendered template.
//! Construction is pure: identical inputs give identical task specs.

use crate::models::{PersonaConfig, Subject, TaskKind, TaskSpec};
use crate::prompts::PromptLibrary;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TaskFactory {
    library: Arc<PromptLibrary>,
}

impl TaskFactory {
    pub fn new(library: Arc<PromptLibrary>) -> Self {
        Self { library }
    }

    pub fn financial_analysis(&self, persona: &Arc<PersonaConfig>, subject: &Subject) -> TaskSpec {
        self.build(TaskKind::FinancialAnalysis, persona, subject)
    }

    pub fn risk_assessment(&self, persona: &Arc<PersonaConfig>, subject: &Subject) -> TaskSpec {
        self.build(TaskKind::RiskAssessment, persona, subject)
    }

    pub fn budget_planning(&self, persona: &Arc<PersonaConfig>, subject: &Subject) -> TaskSpec {
        self.build(TaskKind::BudgetPlanning, persona, subject)
    }

    pub fn investment_advisory(&self, persona: &Arc<PersonaConfig>, subject: &Subject) -> TaskSpec {
        self.build(TaskKind::InvestmentAdvisory, persona, subject)
    }

    pub fn comprehensive_review(&self, persona: &Arc<PersonaConfig>, subject: &Subject) -> TaskSpec {
        self.build(TaskKind::ComprehensiveReview, persona, subject)
    }

    pub fn build(&self, kind: TaskKind, persona: &Arc<PersonaConfig>, subject: &Subject) -> TaskSpec {
        let template = self.library.task(kind);

        TaskSpec {
            kind,
            description: template.description.render(subject),
            expected_output: template.expected_output.clone(),
            persona: Arc::clone(persona),
        }
    }
}
