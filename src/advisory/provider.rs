//! Text-generation providers.
//!
//! `TextProvider` is the seam the generator talks to; `ChatCompletionsProvider`
//! is the OpenAI-compatible HTTP implementation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AdvisoryConfig;
use crate::error::AdvisoryError;

/// Role of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Something that can turn a conversation into one generated line.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AdvisoryError>;
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<ReplyChoice>,
}

#[derive(Debug, Deserialize)]
struct ReplyChoice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` client.
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: &AdvisoryConfig, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Build a provider when the configuration carries a credential.
    pub fn from_config(config: &AdvisoryConfig) -> Option<Self> {
        config
            .api_key
            .clone()
            .map(|key| Self::new(config, key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_failed(&self, reason: impl ToString) -> AdvisoryError {
        AdvisoryError::RequestFailed {
            provider: self.name().to_string(),
            reason: reason.to_string(),
        }
    }

    fn invalid_response(&self, reason: impl ToString) -> AdvisoryError {
        AdvisoryError::InvalidResponse {
            provider: self.name().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl TextProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        "chat_completions"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
        let body = CompletionBody {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::debug!(status = %status, body = %detail, "Chat completion rejected");
            return Err(AdvisoryError::Status {
                provider: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let raw = resp.text().await.map_err(|e| self.request_failed(e))?;
        let reply: CompletionReply = serde_json::from_str(&raw)?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(self.invalid_response("no message content in first choice"));
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::assistant("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn body_shape() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let body = CompletionBody {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.7,
            max_tokens: 150,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn provider_requires_key() {
        let config = AdvisoryConfig::default();
        assert!(ChatCompletionsProvider::from_config(&config).is_none());

        let config = AdvisoryConfig {
            api_key: Some(SecretString::from("sk-test")),
            ..AdvisoryConfig::default()
        };
        let provider = ChatCompletionsProvider::from_config(&config).unwrap();
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert_eq!(provider.name(), "chat_completions");
    }

    #[test]
    fn reply_tolerates_missing_fields() {
        let reply: CompletionReply = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(reply.choices.is_empty());
        let reply: CompletionReply =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(reply.choices[0].message.as_ref().unwrap().content.is_none());
    }
}
