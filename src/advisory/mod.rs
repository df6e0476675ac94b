//! Advisory text: a short empathetic status line that follows the visitor
//! through a flow.
//!
//! Best-effort decoration only: the flow is fully usable when the provider is
//! missing or always failing, because every failure degrades to a canned line.

pub mod context;
pub mod coordinator;
pub mod generator;
pub mod prompts;
pub mod provider;

pub use context::{AdvisoryContext, ContextChoice};
pub use coordinator::{AdvisoryCoordinator, Dispatch};
pub use generator::{Advisory, AdvisoryGenerator, AdvisorySource};
pub use provider::{ChatCompletionsProvider, ChatMessage, Role, TextProvider};

use std::sync::Arc;

use crate::config::AdvisoryConfig;

/// Build a generator from configuration; without a credential it is offline.
pub fn generator_from_config(config: &AdvisoryConfig) -> AdvisoryGenerator {
    match ChatCompletionsProvider::from_config(config) {
        Some(provider) => {
            tracing::info!(model = provider.model(), "Advisory provider enabled");
            AdvisoryGenerator::new(Some(Arc::new(provider)), config.deadline)
        }
        None => {
            tracing::info!("No advisory credential configured, using canned lines");
            AdvisoryGenerator::offline()
        }
    }
}
