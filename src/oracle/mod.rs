//! Oracle: the external service that executes a pipeline
//!
//! The crew never reasons about finance itself. It hands an ordered
//! pipeline to an `Oracle` and returns whatever text comes back.

use crate::error::OracleError;
use crate::llm::ChatModel;
use crate::models::{PersonaConfig, Pipeline, TaskSpec};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// Trait for pipeline execution (LLM controlled)
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Run every task in order and return the final text
    async fn submit(&self, pipeline: &Pipeline) -> Result<String, OracleError>;
}

/// Runs each task as one chat completion, in order, feeding earlier
/// outputs forward as context. The last task's output is the result.
pub struct SequentialOracle {
    model: Arc<dyn ChatModel>,
}

impl SequentialOracle {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Oracle for SequentialOracle {
    async fn submit(&self, pipeline: &Pipeline) -> Result<String, OracleError> {
        let mut outputs: Vec<String> = Vec::with_capacity(pipeline.len());

        for (index, task) in pipeline.tasks().iter().enumerate() {
            let start = Instant::now();
            let system = persona_prompt(&task.persona);
            let prompt = task_prompt(task, &outputs);

            debug!(
                step = index + 1,
                task = %task.kind,
                role = %task.persona.role,
                model = self.model.name(),
                "Submitting task"
            );

            match self.model.complete(&system, &prompt).await {
                Ok(output) => {
                    debug!(
                        step = index + 1,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        chars = output.len(),
                        "Task completed"
                    );
                    outputs.push(output);
                }
                Err(e) => {
                    // Completed outputs are dropped with `outputs`; no partial text escapes.
                    warn!(
                        step = index + 1,
                        completed = outputs.len(),
                        error = %e,
                        "Task failed, discarding pipeline output"
                    );
                    return Err(e);
                }
            }
        }

        outputs
            .pop()
            .ok_or_else(|| OracleError::MalformedResponse("pipeline produced no output".to_string()))
    }
}

fn persona_prompt(persona: &PersonaConfig) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        persona.role, persona.backstory, persona.goal
    )
}

fn task_prompt(task: &TaskSpec, context: &[String]) -> String {
    let mut prompt = format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        task.description, task.expected_output
    );

    if !context.is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(&context.join(CONTEXT_SEPARATOR));
    }

    prompt
}

/// Deterministic oracle for development & testing.
/// Keeps the crew functional without any LLM dependency.
#[derive(Default)]
pub struct MockOracle {
    failure: Option<OracleError>,
    submitted: Mutex<Vec<Pipeline>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// An oracle whose every submission fails with `error`
    pub fn failing(error: OracleError) -> Self {
        Self {
            failure: Some(error),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Pipelines received so far, in submission order
    pub async fn submitted(&self) -> Vec<Pipeline> {
        self.submitted.lock().await.clone()
    }

    /// The text returned for a successful submission
    pub fn transcript(pipeline: &Pipeline) -> String {
        pipeline
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, task)| {
                format!(
                    "{}. [{}] {}: {}",
                    i + 1,
                    task.persona.role,
                    task.kind,
                    task.expected_output
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn submit(&self, pipeline: &Pipeline) -> Result<String, OracleError> {
        self.submitted.lock().await.push(pipeline.clone());

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(Self::transcript(pipeline)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Subject, TaskKind};
    use crate::personas::PersonaRegistry;
    use crate::prompts::PromptLibrary;
    use crate::tasks::TaskFactory;

    /// Chat model that answers from a script and records every prompt
    struct ScriptedModel {
        fail_at: Option<usize>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedModel {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                fail_at,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, system: &str, prompt: &str) -> Result<String, OracleError> {
            let mut calls = self.calls.lock().await;
            let step = calls.len();
            calls.push((system.to_string(), prompt.to_string()));

            if self.fail_at == Some(step) {
                return Err(OracleError::RateLimited("quota exhausted".to_string()));
            }
            Ok(format!("output-{}", step + 1))
        }
    }

    fn two_step_pipeline() -> Pipeline {
        let library = Arc::new(PromptLibrary::bundled().unwrap());
        let registry = PersonaRegistry::new(library.clone());
        let factory = TaskFactory::new(library);

        let analyst = registry.financial_analyst();
        let risk = registry.risk_assessor();
        let subject = Subject::new("ACME Corp").unwrap();

        Pipeline::new(
            vec![analyst.clone(), risk.clone()],
            vec![
                factory.financial_analysis(&analyst, &subject),
                factory.risk_assessment(&risk, &subject),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sequential_oracle_returns_last_output() {
        let model = Arc::new(ScriptedModel::new(None));
        let oracle = SequentialOracle::new(model.clone());

        let result = oracle.submit(&two_step_pipeline()).await.unwrap();
        assert_eq!(result, "output-2");

        let calls = model.calls.lock().await;
        assert_eq!(calls.len(), 2);
        assert!(calls[0].0.starts_with("You are Financial Analyst."));
        assert!(calls[1].0.starts_with("You are Risk Assessment Specialist."));
    }

    #[tokio::test]
    async fn test_earlier_outputs_become_context() {
        let model = Arc::new(ScriptedModel::new(None));
        let oracle = SequentialOracle::new(model.clone());
        oracle.submit(&two_step_pipeline()).await.unwrap();

        let calls = model.calls.lock().await;
        assert!(!calls[0].1.contains("context you're working with"));
        assert!(calls[1].1.contains("context you're working with:\noutput-1"));
        assert!(calls[1].1.contains("ACME Corp"));
    }

    #[tokio::test]
    async fn test_failure_midway_returns_error_unchanged() {
        let model = Arc::new(ScriptedModel::new(Some(1)));
        let oracle = SequentialOracle::new(model.clone());

        let err = oracle.submit(&two_step_pipeline()).await.unwrap_err();
        assert_eq!(err, OracleError::RateLimited("quota exhausted".to_string()));
        assert_eq!(model.calls.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_oracle_records_and_transcribes() {
        let oracle = MockOracle::new();
        let pipeline = two_step_pipeline();

        let text = oracle.submit(&pipeline).await.unwrap();
        assert!(text.starts_with("1. [Financial Analyst] financial-analysis:"));
        assert!(text.contains("\n2. [Risk Assessment Specialist] risk-assessment:"));

        let submitted = oracle.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].tasks()[1].kind, TaskKind::RiskAssessment);
    }

    #[tokio::test]
    async fn test_failing_mock_oracle() {
        let oracle = MockOracle::failing(OracleError::Network("connection reset".into()));
        let err = oracle.submit(&two_step_pipeline()).await.unwrap_err();
        assert_eq!(err, OracleError::Network("connection reset".into()));
    }
}
