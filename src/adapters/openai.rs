use crate::config::toml_config::GeneratorConfig;
use crate::domain::ports::ReplyGenerator;
use crate::utils::error::{HeroError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.4,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| HeroError::MissingConfigError {
                field: "generator.api_key".to_string(),
            })?;

        tracing::info!(
            endpoint = %config.endpoint,
            model = %config.model,
            "Creating chat completions generator"
        );

        Ok(Self::new(
            config.endpoint.clone(),
            api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_temperature(config.temperature))
    }

    fn generation_error(&self, message: String) -> HeroError {
        HeroError::GenerationError {
            message: format!("{} ({})", message, self.endpoint),
        }
    }
}

#[async_trait]
impl ReplyGenerator for OpenAiGenerator {
    async fn generate(&self, system_instruction: &str, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(self.generation_error(format!("HTTP {}: {}", status, preview(&body))));
        }

        // proxies sometimes answer 200 with an HTML error page
        if body.trim_start().starts_with('<') {
            return Err(self.generation_error(format!(
                "HTML instead of JSON: {}",
                preview(body.trim_start())
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            self.generation_error(format!("unreadable response ({}): {}", e, preview(&body)))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| self.generation_error("response has no content".to_string()))?;

        tracing::debug!(chars = content.len(), "Generator replied");
        Ok(content)
    }
}
