//! Response text generation.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::config::OpenAiSettings;
use crate::error::{Error, ResponderError, Result};

const SYSTEM_PROMPT: &str = "You are a concise assistant for a persistence demo. \
     Respond in 1-2 short lines, grounded in the provided memory summary.";

/// Produces the reply for a turn from the user's message and what is
/// remembered about them.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        user_message: &str,
        memory_summary: &str,
    ) -> std::result::Result<String, ResponderError>;
}

/// The canned reply used when no model is configured.
pub fn template_response(user_message: &str, memory_summary: &str) -> String {
    format!("You said: {user_message}\nMemory: {memory_summary}")
}

/// Echoes the message and memory summary. Deterministic, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResponder;

#[async_trait]
impl Responder for TemplateResponder {
    async fn respond(
        &self,
        user_message: &str,
        memory_summary: &str,
    ) -> std::result::Result<String, ResponderError> {
        Ok(template_response(user_message, memory_summary))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Responds through the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiResponder {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiResponder {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Request body for one turn.
    pub fn build_request_payload(&self, user_message: &str, memory_summary: &str) -> serde_json::Value {
        json!({
            "model": self.settings.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "User message: {user_message}\nMemory summary: {memory_summary}"
                    ),
                },
            ],
        })
    }
}

/// First choice's text, trimmed; `None` when it is missing or blank.
fn completion_text(completion: ChatCompletion) -> std::result::Result<Option<String>, ResponderError> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ResponderError::Malformed("response has no choices".to_string()))?;
    Ok(choice
        .message
        .content
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty()))
}

#[async_trait]
impl Responder for OpenAiResponder {
    async fn respond(
        &self,
        user_message: &str,
        memory_summary: &str,
    ) -> std::result::Result<String, ResponderError> {
        let payload = self.build_request_payload(user_message, memory_summary);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status, model = %self.settings.model, "chat completion failed");
            return Err(ResponderError::api(status, error_text));
        }

        let completion: ChatCompletion = response.json().await?;
        match completion_text(completion)? {
            Some(text) => Ok(text),
            None => {
                tracing::debug!("empty completion, falling back to template");
                Ok(template_response(user_message, memory_summary))
            }
        }
    }
}
