//! Gemini API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use super::{ChatModel, ModelOptions};
use crate::error::OracleError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    options: ModelOptions,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: Option<String>, options: ModelOptions) -> Self {
        Self {
            client,
            api_key,
            options,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", BASE_URL, self.options.model)
    }

    fn build_request(&self, system: &str, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.options.temperature,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: self.options.max_output_tokens,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
        }
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, OracleError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OracleError::MissingCredential("GEMINI_API_KEY".to_string()))?;

        let request = self.build_request(system, prompt);

        debug!(model = %self.options.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                OracleError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API error response: {}", error_text);
            return Err(OracleError::from_status(status.as_u16(), error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            OracleError::MalformedResponse(format!("Gemini parse error: {}", e))
        })?;

        extract_answer(gemini_response)
    }
}

fn extract_answer(response: GeminiResponse) -> Result<String, OracleError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::MalformedResponse("No response from Gemini API".to_string()))?;

    match candidate.finish_reason.as_deref() {
        Some("STOP") | None => {}
        Some(reason) => warn!(finish_reason = reason, "Gemini response truncated"),
    }

    if let Some(usage) = &response.usage_metadata {
        debug!(
            prompt_tokens = usage.prompt_token_count,
            candidate_tokens = usage.candidates_token_count,
            "Gemini response received"
        );
    }

    let answer: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if answer.trim().is_empty() {
        return Err(OracleError::MalformedResponse(
            "Empty response from Gemini".to_string(),
        ));
    }

    Ok(answer)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(
            Client::new(),
            api_key.map(str::to_string),
            ModelOptions {
                model: "gemini-2.0-flash".to_string(),
                temperature: 0.3,
                max_output_tokens: 1024,
            },
        )
    }

    #[test]
    fn test_request_serialization() {
        let request = client(Some("k")).build_request("You are a financial advisor", "What is RSI?");

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("What is RSI?"));
        assert!(json.contains("\"systemInstruction\""));
        assert!(json.contains("\"maxOutputTokens\":1024"));
    }

    #[test]
    fn test_endpoint_includes_model() {
        assert!(client(None).endpoint().ends_with("/gemini-2.0-flash:generateContent"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let err = client(None).complete("system", "prompt").await.unwrap_err();
        assert_eq!(err, OracleError::MissingCredential("GEMINI_API_KEY".to_string()));
    }

    #[test]
    fn test_extract_answer_joins_parts() {
        let body: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Diversify "},{"text":"broadly."}]},
                "finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":5,"candidatesTokenCount":3}}"#,
        )
        .unwrap();
        assert_eq!(extract_answer(body).unwrap(), "Diversify broadly.");

        let none: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(extract_answer(none), Err(OracleError::MalformedResponse(_))));
    }
}
