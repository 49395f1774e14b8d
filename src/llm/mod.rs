//! Chat model clients
//!
//! The oracle only needs "system + user message in, text out"; each hosted
//! provider implements that behind `ChatModel`.

use crate::config::{Provider, Settings};
use crate::error::{CrewError, OracleError};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// A single-turn chat completion endpoint
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> std::result::Result<String, OracleError>;
}

/// Sampling parameters shared by every provider
#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl ModelOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: 2048,
        }
    }
}

/// Reusable connection-pooled HTTP client
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CrewError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Build the chat model selected by `settings.provider`.
/// A missing key is accepted here and reported on first use.
pub fn build_chat_model(settings: &Settings) -> Result<Arc<dyn ChatModel>> {
    let client = http_client(settings.timeout_secs)?;
    let options = ModelOptions::from_settings(settings);

    let model: Arc<dyn ChatModel> = match settings.provider {
        Provider::OpenAi => Arc::new(OpenAiClient::new(
            client,
            settings.api_key.clone(),
            settings.base_url.clone(),
            options,
        )),
        Provider::Gemini => Arc::new(GeminiClient::new(client, settings.api_key.clone(), options)),
    };

    Ok(model)
}
