//! Advisory generator: one best-effort request, canned line on any failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AdvisoryError;

use super::context::AdvisoryContext;
use super::prompts::{SYSTEM_PROMPT, context_prompt, fallback_message};
use super::provider::{ChatMessage, TextProvider};

/// Where a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorySource {
    Generated,
    Fallback,
}

/// A line ready for the advisory panel. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub text: String,
    pub source: AdvisorySource,
    pub created_at: DateTime<Utc>,
}

impl Advisory {
    fn generated(text: String) -> Self {
        Self {
            text,
            source: AdvisorySource::Generated,
            created_at: Utc::now(),
        }
    }

    pub fn fallback(ctx: &AdvisoryContext) -> Self {
        Self {
            text: fallback_message(ctx).to_string(),
            source: AdvisorySource::Fallback,
            created_at: Utc::now(),
        }
    }
}

/// Produces advisory lines from context.
pub struct AdvisoryGenerator {
    provider: Option<Arc<dyn TextProvider>>,
    deadline: Duration,
}

impl AdvisoryGenerator {
    pub fn new(provider: Option<Arc<dyn TextProvider>>, deadline: Duration) -> Self {
        Self { provider, deadline }
    }

    /// A generator that only ever returns canned lines.
    pub fn offline() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Build the request: system prompt, prior lines as assistant turns,
    /// then the serialised context.
    pub fn build_messages(ctx: &AdvisoryContext, history: &[String]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(history.iter().map(|line| ChatMessage::assistant(line.as_str())));
        messages.push(ChatMessage::user(context_prompt(ctx)));
        messages
    }

    /// Generate a line. Never fails and never returns empty text.
    pub async fn generate(&self, ctx: &AdvisoryContext, history: &[String]) -> Advisory {
        match self.try_generate(ctx, history).await {
            Ok(text) => {
                info!(chars = text.len(), "Generated advisory line");
                Advisory::generated(text)
            }
            Err(AdvisoryError::NotConfigured) => {
                debug!("No advisory provider, using canned line");
                Advisory::fallback(ctx)
            }
            Err(e) => {
                warn!(error = %e, "Advisory generation failed, using canned line");
                Advisory::fallback(ctx)
            }
        }
    }

    async fn try_generate(
        &self,
        ctx: &AdvisoryContext,
        history: &[String],
    ) -> Result<String, AdvisoryError> {
        let provider = self.provider.as_ref().ok_or(AdvisoryError::NotConfigured)?;
        let messages = Self::build_messages(ctx, history);

        let text = tokio::time::timeout(self.deadline, provider.complete(&messages))
            .await
            .map_err(|_| AdvisoryError::Timeout {
                provider: provider.name().to_string(),
                timeout: self.deadline,
            })??;

        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisoryError::InvalidResponse {
                provider: provider.name().to_string(),
                reason: "empty text".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::advisory::prompts::DEFAULT_FALLBACK;
    use crate::flow::{ChoiceValue, JourneyStep, Situation};

    struct FixedProvider(&'static str);

    #[async_trait]
    impl TextProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TextProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Status {
                provider: "failing".to_string(),
                status: 503,
            })
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl TextProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AdvisoryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn housing() -> AdvisoryContext {
        let mut ctx = AdvisoryContext::new();
        ctx.set_entry_choice(ChoiceValue::Housing);
        ctx
    }

    #[tokio::test]
    async fn uses_provider_text() {
        let generator =
            AdvisoryGenerator::new(Some(Arc::new(FixedProvider("  Welcome.  "))), Duration::from_secs(1));
        let advisory = generator.generate(&housing(), &[]).await;
        assert_eq!(advisory.text, "Welcome.");
        assert_eq!(advisory.source, AdvisorySource::Generated);
    }

    #[tokio::test]
    async fn failure_falls_back_to_housing_line() {
        let generator = AdvisoryGenerator::new(Some(Arc::new(FailingProvider)), Duration::from_secs(1));
        let advisory = generator.generate(&housing(), &[]).await;
        assert_eq!(advisory.source, AdvisorySource::Fallback);
        assert_eq!(advisory.text, fallback_message(&housing()));
        assert_ne!(advisory.text, DEFAULT_FALLBACK);
    }

    #[tokio::test]
    async fn empty_reply_falls_back() {
        let generator = AdvisoryGenerator::new(Some(Arc::new(FixedProvider("   "))), Duration::from_secs(1));
        let advisory = generator.generate(&AdvisoryContext::new(), &[]).await;
        assert_eq!(advisory.text, DEFAULT_FALLBACK);
    }

    #[tokio::test]
    async fn deadline_falls_back() {
        let generator = AdvisoryGenerator::new(Some(Arc::new(SlowProvider)), Duration::from_millis(20));
        let mut ctx = AdvisoryContext::new();
        ctx.set_situation(Situation::Room);
        let advisory = generator.generate(&ctx, &[]).await;
        assert_eq!(advisory.source, AdvisorySource::Fallback);
        assert!(advisory.text.starts_with("Looking for verified housing"));
    }

    #[tokio::test]
    async fn always_failing_is_deterministic_and_non_empty() {
        let generator = AdvisoryGenerator::new(Some(Arc::new(FailingProvider)), Duration::from_secs(1));
        let mut contexts = vec![AdvisoryContext::new()];
        for choice in ChoiceValue::ALL {
            let mut ctx = AdvisoryContext::new();
            ctx.set_entry_choice(choice);
            contexts.push(ctx);
        }
        for situation in Situation::ALL {
            let mut ctx = AdvisoryContext::new();
            ctx.set_situation(situation);
            ctx.set_current_step(JourneyStep::Choose);
            contexts.push(ctx);
        }
        for ctx in &contexts {
            let first = generator.generate(ctx, &[]).await;
            let second = generator.generate(ctx, &["earlier".to_string()]).await;
            assert!(!first.text.is_empty());
            assert_eq!(first.text, second.text);
        }
    }

    #[tokio::test]
    async fn offline_generator_uses_fallback() {
        let generator = AdvisoryGenerator::offline();
        assert!(!generator.has_provider());
        let advisory = generator.generate(&housing(), &[]).await;
        assert_eq!(advisory.source, AdvisorySource::Fallback);
    }

    #[test]
    fn messages_include_history_as_assistant_turns() {
        let history = vec!["first".to_string(), "second".to_string()];
        let messages = AdvisoryGenerator::build_messages(&housing(), &history);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1], ChatMessage::assistant("first"));
        assert_eq!(messages[3].role, crate::advisory::provider::Role::User);
    }
}
