//! Finance crew - composes personas and tasks into fixed pipelines
//!
//! INPUT → SELECT PERSONAS → BIND TASKS → SUBMIT → RESULT
//!
//! Each service operation is stateless: it builds its own pipeline, submits
//! it once and returns the oracle's text untouched. Oracle failures are
//! propagated as-is, with no retry and no partial output.

use crate::models::{PersonaConfig, Pipeline, Subject};
use crate::oracle::Oracle;
use crate::personas::PersonaRegistry;
use crate::prompts::PromptLibrary;
use crate::tasks::TaskFactory;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

pub struct FinanceCrew {
    personas: PersonaRegistry,
    tasks: TaskFactory,
    oracle: Arc<dyn Oracle>,
}

impl FinanceCrew {
    pub fn new(library: Arc<PromptLibrary>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            personas: PersonaRegistry::new(library.clone()),
            tasks: TaskFactory::new(library),
            oracle,
        }
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    pub fn tasks(&self) -> &TaskFactory {
        &self.tasks
    }

    // =============================
    // Pipeline assembly
    // =============================

    /// financial-analysis (analyst) → risk-assessment (risk assessor)
    pub fn company_analysis_pipeline(&self, company: &Subject) -> Result<Pipeline> {
        let analyst = self.personas.financial_analyst();
        let risk = self.personas.risk_assessor();

        let investment = Subject::new(format!("{} stock investment", company))?;

        let tasks = vec![
            self.tasks.financial_analysis(&analyst, company),
            self.tasks.risk_assessment(&risk, &investment),
        ];

        Pipeline::new(crew_of(&[analyst, risk]), tasks)
    }

    /// budget-planning (planner) → investment-advisory (advisor) →
    /// comprehensive-review (analyst)
    pub fn personal_finance_pipeline(&self, client_profile: &Subject) -> Result<Pipeline> {
        let planner = self.personas.budget_planner();
        let advisor = self.personas.investment_advisor();
        let analyst = self.personas.financial_analyst();

        let tasks = vec![
            self.tasks.budget_planning(&planner, client_profile),
            self.tasks.investment_advisory(&advisor, client_profile),
            self.tasks.comprehensive_review(&analyst, client_profile),
        ];

        Pipeline::new(crew_of(&[planner, advisor, analyst]), tasks)
    }

    /// financial-analysis (analyst) → risk-assessment (risk assessor) →
    /// investment-advisory (advisor)
    pub fn investment_analysis_pipeline(&self, details: &Subject) -> Result<Pipeline> {
        let analyst = self.personas.financial_analyst();
        let risk = self.personas.risk_assessor();
        let advisor = self.personas.investment_advisor();

        let advisory_subject = Subject::new(format!("Analysis for {}", details))?;

        let tasks = vec![
            self.tasks.financial_analysis(&analyst, details),
            self.tasks.risk_assessment(&risk, details),
            self.tasks.investment_advisory(&advisor, &advisory_subject),
        ];

        Pipeline::new(crew_of(&[analyst, risk, advisor]), tasks)
    }

    // =============================
    // Service operations
    // =============================

    pub async fn analyze_company(&self, company: &str) -> Result<String> {
        let company = Subject::new(company)?;
        let pipeline = self.company_analysis_pipeline(&company)?;
        self.kickoff("analyze_company", pipeline).await
    }

    pub async fn plan_personal_finances(&self, client_profile: &str) -> Result<String> {
        let profile = Subject::new(client_profile)?;
        let pipeline = self.personal_finance_pipeline(&profile)?;
        self.kickoff("plan_personal_finances", pipeline).await
    }

    pub async fn analyze_investment(&self, details: &str) -> Result<String> {
        let details = Subject::new(details)?;
        let pipeline = self.investment_analysis_pipeline(&details)?;
        self.kickoff("analyze_investment", pipeline).await
    }

    /// Submit once and wait. The pipeline is dropped when this returns.
    async fn kickoff(&self, operation: &'static str, pipeline: Pipeline) -> Result<String> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();

        info!(
            %run_id,
            operation,
            tasks = pipeline.len(),
            fingerprint = %pipeline.fingerprint(),
            "Crew run starting"
        );

        match self.oracle.submit(&pipeline).await {
            Ok(output) => {
                info!(
                    %run_id,
                    operation,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Crew run finished"
                );
                Ok(output)
            }
            Err(e) => {
                error!(%run_id, operation, error = %e, "Crew run failed");
                Err(e.into())
            }
        }
    }
}

fn crew_of(personas: &[Arc<PersonaConfig>]) -> Vec<Arc<PersonaConfig>> {
    personas.iter().map(Arc::clone).collect()
}
