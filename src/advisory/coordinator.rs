//! Latest-context-wins request coordinator.
//!
//! Each context change dispatches at most one background request. An
//! unchanged context is skipped, a newer dispatch aborts the one in flight,
//! and a response whose generation is no longer current is dropped. Callers
//! never await the network.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::context::AdvisoryContext;
use super::generator::{Advisory, AdvisoryGenerator};
use super::prompts::fallback_message;

/// Accepted lines replayed to the provider as history.
pub const HISTORY_LIMIT: usize = 6;

/// What `submit` did with a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing worth personalising yet.
    Skipped,
    /// Same serialised context as the last dispatch.
    Duplicate,
    /// A request was started for this generation.
    Dispatched { generation: u64 },
}

#[derive(Default)]
struct Inner {
    last_key: Option<String>,
    generation: u64,
    history: Vec<String>,
    in_flight: Option<JoinHandle<()>>,
}

/// Coordinates advisory requests for one flow session.
pub struct AdvisoryCoordinator {
    generator: Arc<AdvisoryGenerator>,
    inner: Arc<Mutex<Inner>>,
    tx: Arc<watch::Sender<Option<Advisory>>>,
}

impl AdvisoryCoordinator {
    pub fn new(generator: Arc<AdvisoryGenerator>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            generator,
            inner: Arc::new(Mutex::new(Inner::default())),
            tx: Arc::new(tx),
        }
    }

    /// Subscribe to accepted advisory lines.
    pub fn subscribe(&self) -> watch::Receiver<Option<Advisory>> {
        self.tx.subscribe()
    }

    /// Latest accepted line, if any.
    pub fn current(&self) -> Option<Advisory> {
        self.tx.borrow().clone()
    }

    /// Text for the advisory panel: the latest line, or the canned line for
    /// `ctx` so the panel is never blank.
    pub fn display_text(&self, ctx: &AdvisoryContext) -> String {
        match self.current() {
            Some(advisory) => advisory.text,
            None => fallback_message(ctx).to_string(),
        }
    }

    /// The most recent accepted lines, oldest first.
    pub async fn history(&self) -> Vec<String> {
        self.inner.lock().await.history.clone()
    }

    /// Notify the coordinator that the context changed.
    pub async fn submit(&self, ctx: &AdvisoryContext) -> Dispatch {
        if !ctx.is_meaningful() {
            return Dispatch::Skipped;
        }

        let key = ctx.key();
        let mut inner = self.inner.lock().await;
        if inner.last_key.as_deref() == Some(key.as_str()) {
            return Dispatch::Duplicate;
        }

        inner.last_key = Some(key);
        inner.generation += 1;
        let generation = inner.generation;

        if let Some(stale) = inner.in_flight.take() {
            debug!(generation, "Aborting stale advisory request");
            stale.abort();
        }

        let history = inner.history.clone();
        let ctx = ctx.clone();
        let generator = Arc::clone(&self.generator);
        let shared = Arc::clone(&self.inner);
        let tx = Arc::clone(&self.tx);

        inner.in_flight = Some(tokio::spawn(async move {
            let advisory = generator.generate(&ctx, &history).await;

            let mut inner = shared.lock().await;
            if inner.generation != generation {
                debug!(
                    generation,
                    current = inner.generation,
                    "Discarding advisory for stale context"
                );
                return;
            }
            inner.history.push(advisory.text.clone());
            let overflow = inner.history.len().saturating_sub(HISTORY_LIMIT);
            inner.history.drain(..overflow);
            inner.in_flight = None;
            tx.send_replace(Some(advisory));
        }));

        Dispatch::Dispatched { generation }
    }

    /// Forget the session: abort any request, clear history and the panel.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(handle) = inner.in_flight.take() {
            handle.abort();
        }
        inner.generation += 1;
        inner.last_key = None;
        inner.history.clear();
        self.tx.send_replace(None);
    }
}
