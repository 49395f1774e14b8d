//! Runtime settings read from the environment
//!
//! `.env` is loaded by the binaries before `Settings::from_env` runs.

use crate::error::CrewError;
use crate::Result;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    /// Environment variable holding this provider's API key
    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => DEFAULT_OPENAI_MODEL,
            Provider::Gemini => DEFAULT_GEMINI_MODEL,
        }
    }
}

impl FromStr for Provider {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            other => Err(CrewError::Config(format!(
                "unknown provider '{}' (expected openai or gemini)",
                other
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    /// Absent keys are tolerated until an oracle call is made
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub prompts_dir: Option<PathBuf>,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup (the process env in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match non_empty("FINANCE_CREW_PROVIDER") {
            Some(value) => value.parse()?,
            None => Provider::OpenAi,
        };

        let api_key = non_empty(provider.credential_var());

        let model = non_empty("FINANCE_CREW_MODEL")
            .unwrap_or_else(|| provider.default_model().to_string());

        let temperature = parse_or(
            "FINANCE_CREW_TEMPERATURE",
            non_empty("FINANCE_CREW_TEMPERATURE"),
            DEFAULT_TEMPERATURE,
        )?;
        let timeout_secs = parse_or(
            "FINANCE_CREW_TIMEOUT_SECS",
            non_empty("FINANCE_CREW_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;

        let (port_key, port_value) = match non_empty("PORT") {
            Some(value) => ("PORT", Some(value)),
            None => ("API_PORT", non_empty("API_PORT")),
        };
        let port = parse_or(port_key, port_value, DEFAULT_PORT)?;

        Ok(Self {
            provider,
            api_key,
            model,
            temperature,
            base_url: non_empty("OPENAI_BASE_URL"),
            timeout_secs,
            prompts_dir: non_empty("FINANCE_CREW_PROMPTS_DIR").map(PathBuf::from),
            port,
        })
    }

    /// Advisory check run once at startup; a missing key is not fatal here
    pub fn check_credential(&self) -> Result<()> {
        if self.api_key.is_some() {
            Ok(())
        } else {
            Err(CrewError::ConfigurationMissing(format!(
                "{} not set; set it in the environment or a .env file before running an analysis",
                self.provider.credential_var()
            )))
        }
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CrewError::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}
