//! Core data models for the finance crew

use crate::error::CrewError;
use crate::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    FinancialAnalyst,
    RiskAssessor,
    BudgetPlanner,
    InvestmentAdvisor,
}

impl PersonaKind {
    pub const ALL: [PersonaKind; 4] = [
        PersonaKind::FinancialAnalyst,
        PersonaKind::RiskAssessor,
        PersonaKind::BudgetPlanner,
        PersonaKind::InvestmentAdvisor,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    FinancialAnalysis,
    RiskAssessment,
    BudgetPlanning,
    InvestmentAdvisory,
    ComprehensiveReview,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::FinancialAnalysis,
        TaskKind::RiskAssessment,
        TaskKind::BudgetPlanning,
        TaskKind::InvestmentAdvisory,
        TaskKind::ComprehensiveReview,
    ];
}

//
// ================= Persona =================
//

/// A role the oracle is asked to emulate. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

//
// ================= Subject =================
//

/// Free-text subject interpolated into a task template.
///
/// Never blank. The text is stored exactly as supplied so it appears
/// verbatim in every rendered description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CrewError::InputInvalid(
                "subject must not be blank".to_string(),
            ));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Personal finance details collected for the planning pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientProfile {
    pub age: String,
    pub income: String,
    pub savings: String,
    pub goals: String,
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Age: {}, Income: {}, Savings: {}, Goals: {}",
            self.age, self.income, self.savings, self.goals
        )
    }
}

//
// ================= Task =================
//

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskSpec {
    pub kind: TaskKind,
    pub description: String,
    pub expected_output: String,
    /// Shared with the pipeline's persona set; never owned by the task.
    pub persona: Arc<PersonaConfig>,
}

//
// ================= Pipeline =================
//

/// Ordered tasks submitted to the oracle as one sequential run
#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    personas: Vec<Arc<PersonaConfig>>,
    tasks: Vec<TaskSpec>,
}

impl Pipeline {
    /// Assemble a pipeline, checking that it is non-empty, that persona
    /// roles are unique and that every task is bound to a member persona.
    pub fn new(personas: Vec<Arc<PersonaConfig>>, tasks: Vec<TaskSpec>) -> Result<Self> {
        if tasks.is_empty() {
            return Err(CrewError::InvalidPipeline(
                "pipeline must contain at least one task".to_string(),
            ));
        }

        for (i, persona) in personas.iter().enumerate() {
            if personas[..i].iter().any(|p| p.role == persona.role) {
                return Err(CrewError::InvalidPipeline(format!(
                    "duplicate persona role '{}'",
                    persona.role
                )));
            }
        }

        for task in &tasks {
            if !personas.iter().any(|p| **p == *task.persona) {
                return Err(CrewError::InvalidPipeline(format!(
                    "task {:?} is bound to '{}', which is not part of the crew",
                    task.kind, task.persona.role
                )));
            }
        }

        Ok(Self { personas, tasks })
    }

    pub fn personas(&self) -> &[Arc<PersonaConfig>] {
        &self.personas
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// SHA-256 of the serialized tasks, hex encoded.
    /// Streams JSON straight into the hasher.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        if serde_json::to_writer(&mut HashWriter(&mut hasher), &self.tasks).is_err() {
            return String::new();
        }

        hex::encode(hasher.finalize())
    }
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PersonaKind::FinancialAnalyst => "financial-analyst",
            PersonaKind::RiskAssessor => "risk-assessor",
            PersonaKind::BudgetPlanner => "budget-planner",
            PersonaKind::InvestmentAdvisor => "investment-advisor",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskKind::FinancialAnalysis => "financial-analysis",
            TaskKind::RiskAssessment => "risk-assessment",
            TaskKind::BudgetPlanning => "budget-planning",
            TaskKind::InvestmentAdvisory => "investment-advisory",
            TaskKind::ComprehensiveReview => "comprehensive-review",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(role: &str) -> Arc<PersonaConfig> {
        Arc::new(PersonaConfig {
            role: role.to_string(),
            goal: "goal".to_string(),
            backstory: "backstory".to_string(),
        })
    }

    fn task(persona: &Arc<PersonaConfig>) -> TaskSpec {
        TaskSpec {
            kind: TaskKind::FinancialAnalysis,
            description: "Analyze ACME".to_string(),
            expected_output: "A report".to_string(),
            persona: Arc::clone(persona),
        }
    }

    #[test]
    fn test_blank_subject_rejected() {
        assert!(matches!(Subject::new(""), Err(CrewError::InputInvalid(_))));
        assert!(matches!(Subject::new("   \t"), Err(CrewError::InputInvalid(_))));
    }

    #[test]
    fn test_subject_kept_verbatim() {
        let subject = Subject::new("  Apple Inc. ").unwrap();
        assert_eq!(subject.as_str(), "  Apple Inc. ");
    }

    #[test]
    fn test_client_profile_display() {
        let profile = ClientProfile {
            age: "30".into(),
            income: "$75,000".into(),
            savings: "$25,000".into(),
            goals: "Buy house in 5 years".into(),
        };
        assert_eq!(
            profile.to_string(),
            "Age: 30, Income: $75,000, Savings: $25,000, Goals: Buy house in 5 years"
        );
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let result = Pipeline::new(vec![persona("Analyst")], vec![]);
        assert!(matches!(result, Err(CrewError::InvalidPipeline(_))));
    }

    #[test]
    fn test_task_bound_outside_crew_rejected() {
        let analyst = persona("Analyst");
        let outsider = persona("Outsider");
        let result = Pipeline::new(vec![analyst], vec![task(&outsider)]);
        assert!(matches!(result, Err(CrewError::InvalidPipeline(_))));
    }

    #[test]
    fn test_duplicate_roles_rejected() {
        let a = persona("Analyst");
        let b = persona("Analyst");
        let result = Pipeline::new(vec![a.clone(), b], vec![task(&a)]);
        assert!(matches!(result, Err(CrewError::InvalidPipeline(_))));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let analyst = persona("Analyst");
        let first = Pipeline::new(vec![analyst.clone()], vec![task(&analyst)]).unwrap();
        let second = Pipeline::new(vec![analyst.clone()], vec![task(&analyst)]).unwrap();

        assert_eq!(first.fingerprint().len(), 64);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }
}
