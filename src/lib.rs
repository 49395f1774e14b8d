//! Finance Crew
//!
//! Four finance personas and five task templates, composed into fixed
//! multi-agent pipelines and executed by a hosted LLM:
//! - Personas and prompts are data, loaded and validated at startup
//! - Every task description embeds the caller's subject verbatim
//! - Pipelines run strictly in order; failures surface unchanged
//!
//! FLOW:
//! SUBJECT → PERSONAS → TASKS → PIPELINE → ORACLE → RESULT

pub mod api;
pub mod config;
pub mod console;
pub mod crew;
pub mod demo;
pub mod error;
pub mod llm;
pub mod models;
pub mod oracle;
pub mod personas;
pub mod prompts;
pub mod tasks;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use crew::FinanceCrew;
pub use error::{CrewError, OracleError};
pub use oracle::{MockOracle, Oracle, SequentialOracle};
