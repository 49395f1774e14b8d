//! Prompt data: persona text and task templates
//!
//! Bundled JSON resources are compiled in; a prompts directory can override
//! either file at runtime so prompts are editable without a rebuild.

use crate::error::CrewError;
use crate::models::{PersonaConfig, PersonaKind, TaskKind};
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub mod template;
pub use template::Template;

const BUNDLED_PERSONAS: &str = include_str!("../../config/personas.json");
const BUNDLED_TASKS: &str = include_str!("../../config/tasks.json");

const PERSONAS_FILE: &str = "personas.json";
const TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Deserialize)]
struct PersonaRecord {
    kind: PersonaKind,
    role: String,
    goal: String,
    backstory: String,
}

#[derive(Debug, Deserialize)]
struct TaskRecord {
    kind: TaskKind,
    description: String,
    expected_output: String,
}

/// A parsed task template plus its output-shape hint
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    pub description: Template,
    pub expected_output: String,
}

/// Validated set of persona texts and task templates
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    personas: HashMap<PersonaKind, PersonaConfig>,
    tasks: HashMap<TaskKind, TaskTemplate>,
}

impl PromptLibrary {
    /// Library built from the compiled-in resources
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_PERSONAS, BUNDLED_TASKS)
    }

    /// Load from `dir`, falling back to the bundled copy for any missing file.
    /// The directory itself must exist.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(CrewError::Config(format!(
                "prompts dir {} does not exist",
                dir.display()
            )));
        }

        let personas = read_override(&dir.join(PERSONAS_FILE))?;
        let tasks = read_override(&dir.join(TASKS_FILE))?;

        if personas.is_some() || tasks.is_some() {
            info!(
                dir = %dir.display(),
                personas = personas.is_some(),
                tasks = tasks.is_some(),
                "Loaded prompt overrides"
            );
        } else {
            warn!(dir = %dir.display(), "Prompts dir has no override files, using bundled prompts");
        }

        Self::from_json(
            personas.as_deref().unwrap_or(BUNDLED_PERSONAS),
            tasks.as_deref().unwrap_or(BUNDLED_TASKS),
        )
    }

    /// Bundled library unless an override directory is given
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::bundled(),
        }
    }

    pub fn from_json(personas_json: &str, tasks_json: &str) -> Result<Self> {
        let persona_records: Vec<PersonaRecord> = serde_json::from_str(personas_json)?;
        let task_records: Vec<TaskRecord> = serde_json::from_str(tasks_json)?;

        let mut personas: HashMap<PersonaKind, PersonaConfig> =
            HashMap::with_capacity(persona_records.len());
        for record in persona_records {
            if record.role.trim().is_empty()
                || record.goal.trim().is_empty()
                || record.backstory.trim().is_empty()
            {
                return Err(CrewError::Template(format!(
                    "persona {} has an empty role, goal or backstory",
                    record.kind
                )));
            }

            if personas
                .values()
                .any(|p| p.role == record.role)
            {
                return Err(CrewError::Template(format!(
                    "persona role '{}' is defined twice",
                    record.role
                )));
            }

            let persona = PersonaConfig {
                role: record.role,
                goal: record.goal,
                backstory: record.backstory,
            };

            if personas.insert(record.kind, persona).is_some() {
                return Err(CrewError::Template(format!(
                    "persona {} is defined twice",
                    record.kind
                )));
            }
        }

        let mut tasks: HashMap<TaskKind, TaskTemplate> = HashMap::with_capacity(task_records.len());
        for record in task_records {
            if record.expected_output.trim().is_empty() {
                return Err(CrewError::Template(format!(
                    "task {} has an empty expected_output",
                    record.kind
                )));
            }

            let description = Template::parse(&record.description).map_err(|e| match e {
                CrewError::Template(msg) => {
                    CrewError::Template(format!("task {}: {}", record.kind, msg))
                }
                other => other,
            })?;

            let template = TaskTemplate {
                description,
                expected_output: record.expected_output,
            };

            if tasks.insert(record.kind, template).is_some() {
                return Err(CrewError::Template(format!(
                    "task {} is defined twice",
                    record.kind
                )));
            }
        }

        if let Some(missing) = PersonaKind::ALL.iter().find(|k| !personas.contains_key(*k)) {
            return Err(CrewError::Template(format!("persona {} is missing", missing)));
        }
        if let Some(missing) = TaskKind::ALL.iter().find(|k| !tasks.contains_key(*k)) {
            return Err(CrewError::Template(format!("task {} is missing", missing)));
        }

        debug!(
            personas = personas.len(),
            tasks = tasks.len(),
            "Prompt library validated"
        );

        Ok(Self { personas, tasks })
    }

    pub(crate) fn persona(&self, kind: PersonaKind) -> &PersonaConfig {
        // Presence of every kind is checked in from_json
        &self.personas[&kind]
    }

    pub(crate) fn task(&self, kind: TaskKind) -> &TaskTemplate {
        &self.tasks[&kind]
    }
}

fn read_override(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        debug!(path = %path.display(), "No override found, using bundled copy");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_TASK: &str = r#"[{"kind":"financial_analysis","description":"Look at {subject}","expected_output":"A report"}]"#;

    #[test]
    fn test_bundled_library_is_valid() {
        let library = PromptLibrary::bundled().unwrap();
        for kind in PersonaKind::ALL {
            assert!(!library.persona(kind).role.is_empty());
        }
        for kind in TaskKind::ALL {
            assert!(!library.task(kind).expected_output.is_empty());
        }
    }

    #[test]
    fn test_missing_task_kind_rejected() {
        let result = PromptLibrary::from_json(BUNDLED_PERSONAS, ONE_TASK);
        assert!(matches!(result, Err(CrewError::Template(_))));
    }

    #[test]
    fn test_empty_expected_output_rejected() {
        let tasks = BUNDLED_TASKS.replacen(
            "A detailed financial analysis report with key metrics, trends, and recommendations",
            "  ",
            1,
        );
        let result = PromptLibrary::from_json(BUNDLED_PERSONAS, &tasks);
        assert!(matches!(result, Err(CrewError::Template(_))));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let personas = BUNDLED_PERSONAS.replace("\"Investment Advisor\"", "\"Financial Analyst\"");
        let result = PromptLibrary::from_json(&personas, BUNDLED_TASKS);
        assert!(matches!(result, Err(CrewError::Template(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = PromptLibrary::from_json("not json", BUNDLED_TASKS);
        assert!(matches!(result, Err(CrewError::SerializationError(_))));
    }

    #[test]
    fn test_override_dir_replaces_only_present_files() {
        let dir = std::env::temp_dir().join(format!("finance-crew-prompts-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();

        let personas = BUNDLED_PERSONAS.replace("Financial Analyst", "Equity Analyst");
        fs::write(dir.join(PERSONAS_FILE), personas).unwrap();

        let library = PromptLibrary::load(Some(&dir)).unwrap();
        assert_eq!(library.persona(PersonaKind::FinancialAnalyst).role, "Equity Analyst");
        assert_eq!(
            library.task(TaskKind::RiskAssessment).expected_output,
            "A comprehensive risk assessment report with quantified risk metrics and mitigation strategies"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_override_dir_is_config_error() {
        let dir = std::env::temp_dir().join(format!("finance-crew-absent-{}", uuid::Uuid::new_v4()));

        let result = PromptLibrary::load(Some(&dir));
        assert!(matches!(
            result,
            Err(CrewError::Config(msg)) if msg.contains("does not exist")
        ));
    }

    #[test]
    fn test_empty_override_dir_uses_bundled() {
        let dir = std::env::temp_dir().join(format!("finance-crew-empty-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();

        let library = PromptLibrary::load(Some(&dir)).unwrap();
        assert_eq!(library.persona(PersonaKind::FinancialAnalyst).role, "Financial Analyst");

        fs::remove_dir_all(&dir).unwrap();
    }
}
