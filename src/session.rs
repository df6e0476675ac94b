//! Flow session: one visitor walking one flow.
//!
//! The session owns the sequencer, the gesture adapter, the screen renderer
//! and the advisory context. Every state change is mirrored into the context
//! and handed to the advisory coordinator, which dispatches in the background;
//! no navigation call waits on the network.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::advisory::prompts::fallback_message;
use crate::advisory::{AdvisoryContext, AdvisoryCoordinator, ContextChoice};
use crate::config::FlowConfig;
use crate::flow::screens::render;
use crate::flow::selection::{self, SelectionOutcome};
use crate::flow::{
    ChoiceValue, FeatureKey, JourneyStep, Progress, RenderedScreen, ScreenRenderer,
    ScreenSource, Situation, StepSequencer, Theme, Transition,
};
use crate::gesture::{DragSample, GestureAdapter, GestureResult, WheelSample};

/// A running flow plus everything observing it.
pub struct FlowSession<S>
where
    S: ScreenSource,
    S::Choice: ContextChoice,
{
    seq: StepSequencer<S>,
    gestures: GestureAdapter,
    renderer: ScreenRenderer<S>,
    theme: Theme,
    context: AdvisoryContext,
    coordinator: Option<Arc<AdvisoryCoordinator>>,
}

impl<S> FlowSession<S>
where
    S: ScreenSource,
    S::Choice: ContextChoice,
{
    /// Start a session on the first step. Without a coordinator the advisory
    /// panel shows canned lines only.
    pub fn new(config: &FlowConfig, coordinator: Option<Arc<AdvisoryCoordinator>>) -> Self {
        let seq = StepSequencer::new();
        let mut context = AdvisoryContext::new();
        context.set_current_step(seq.current());
        Self {
            renderer: ScreenRenderer::new(seq.current(), config.motion),
            gestures: GestureAdapter::new(config.gesture.clone()),
            seq,
            theme: Theme::default(),
            context,
            coordinator,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn current(&self) -> S {
        self.seq.current()
    }

    pub fn sequencer(&self) -> &StepSequencer<S> {
        &self.seq
    }

    pub fn renderer(&self) -> &ScreenRenderer<S> {
        &self.renderer
    }

    pub fn context(&self) -> &AdvisoryContext {
        &self.context
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Progress indicator; `None` on the terminal step.
    pub fn progress(&self) -> Option<Progress<S>> {
        Progress::of(&self.seq)
    }

    /// Panel for the current step.
    pub fn render(&self) -> RenderedScreen<S> {
        render(self.seq.current(), self.seq.selection(), self.theme)
    }

    /// Whatever the advisory panel should show right now. Never empty.
    pub fn advisory_text(&self) -> String {
        match &self.coordinator {
            Some(coordinator) => coordinator.display_text(&self.context),
            None => fallback_message(&self.context).to_string(),
        }
    }

    pub fn insights(&self) -> Vec<String> {
        self.context.insights()
    }

    pub async fn next(&mut self) -> Option<Transition<S>> {
        if !self.seq.next() {
            return None;
        }
        self.settle().await
    }

    pub async fn previous(&mut self) -> Option<Transition<S>> {
        if !self.seq.previous() {
            return None;
        }
        self.settle().await
    }

    pub async fn back(&mut self) -> Option<Transition<S>> {
        if !self.seq.back() {
            return None;
        }
        self.settle().await
    }

    pub async fn go_to(&mut self, step: S) -> Option<Transition<S>> {
        if !self.seq.go_to(step) {
            return None;
        }
        self.settle().await
    }

    pub async fn finish(&mut self) -> Option<Transition<S>> {
        self.seq.finish();
        self.settle().await
    }

    /// Commit a choice on the current step.
    pub async fn select(&mut self, choice: S::Choice) -> SelectionOutcome {
        let outcome = selection::commit(&mut self.seq, choice);
        if outcome != SelectionOutcome::Ignored {
            choice.record(&mut self.context);
            self.settle().await;
        }
        outcome
    }

    /// Press the continue control of a confirm-required step.
    pub async fn confirm(&mut self) -> SelectionOutcome {
        let outcome = selection::confirm(&mut self.seq);
        if outcome == SelectionOutcome::Advanced {
            self.settle().await;
        }
        outcome
    }

    pub fn can_confirm(&self) -> bool {
        selection::can_confirm(&self.seq)
    }

    pub async fn drag(&mut self, sample: DragSample) -> GestureResult {
        let before = self.seq.current();
        let intent = self.gestures.on_drag_release(&mut self.seq, sample)?;
        if self.seq.current() != before {
            self.settle().await;
        }
        Ok(intent)
    }

    pub async fn wheel(&mut self, sample: WheelSample, now: Instant) -> GestureResult {
        let before = self.seq.current();
        let intent = self.gestures.on_wheel(&mut self.seq, sample, now)?;
        if self.seq.current() != before {
            self.settle().await;
        }
        Ok(intent)
    }

    /// The view finished animating the transition keyed `key`.
    pub fn complete_transition(&mut self, key: S) -> bool {
        self.renderer.complete(key)
    }

    /// Back to the first step with a fresh context.
    pub async fn restart(&mut self) {
        self.seq.restart();
        self.gestures.reset();
        self.renderer.reset(self.seq.current());
        self.context.reset();
        self.context.set_current_step(self.seq.current());
        if let Some(coordinator) = &self.coordinator {
            coordinator.reset().await;
        }
        debug!(step = %self.seq.current(), "Flow restarted");
    }

    /// Mirror the sequencer into the context, start the screen transition and
    /// notify the coordinator.
    async fn settle(&mut self) -> Option<Transition<S>> {
        let step = self.seq.current();
        self.context.set_current_step(step);
        self.context.merge_completed(self.seq.completed_steps());
        let transition = self.renderer.show(step, self.seq.direction());
        self.notify().await;
        transition
    }

    async fn notify(&self) {
        if let Some(coordinator) = &self.coordinator {
            let dispatch = coordinator.submit(&self.context).await;
            debug!(?dispatch, "Advisory context submitted");
        }
    }
}

/// Walkthrough-only actions: the entry overlay and the feature preview.
impl FlowSession<JourneyStep> {
    /// Apply the entry overlay choice.
    ///
    /// `landed` starts at the welcome chapter; every other choice skips ahead
    /// to the choose chapter with its situation preselected and welcome
    /// counted as done.
    pub async fn choose_entry(&mut self, choice: ChoiceValue) -> Option<Transition<JourneyStep>> {
        self.context.set_entry_choice(choice);
        let (step, situation) = match choice {
            ChoiceValue::Landed => (JourneyStep::Welcome, Situation::Landed),
            ChoiceValue::Housing => (JourneyStep::Choose, Situation::Room),
            ChoiceValue::Essentials => (JourneyStep::Choose, Situation::Essentials),
            ChoiceValue::Community => (JourneyStep::Choose, Situation::People),
        };

        if step != JourneyStep::Welcome {
            self.seq.mark_completed(JourneyStep::Welcome);
        }
        self.seq.set_selection(situation);
        self.context.set_situation(situation);
        self.seq.go_to(step);
        debug!(entry = %choice, step = %step, situation = %situation, "Entry choice applied");
        self.settle().await
    }

    /// The situation the explore chapter is framed by.
    pub fn situation(&self) -> Situation {
        self.seq.selection().unwrap_or_default()
    }

    /// Open a feature card in the explore chapter. Returns whether the context
    /// changed; features outside the current situation's preview are ignored.
    pub async fn view_feature(&mut self, feature: FeatureKey) -> bool {
        if self.seq.current() != JourneyStep::Explore {
            debug!(feature = %feature, "Feature viewed outside explore, ignoring");
            return false;
        }
        if !self.situation().visible_features().contains(&feature) {
            debug!(feature = %feature, situation = %self.situation(), "Feature not in preview");
            return false;
        }

        let added = self.context.add_feature(feature);
        self.seq.mark_completed(JourneyStep::Explore);
        let completed = self.context.complete_step(JourneyStep::Explore);
        if added || completed {
            self.notify().await;
        }
        added || completed
    }

    /// The "start over" control: a fresh walkthrough behind the entry overlay.
    pub async fn start_over(&mut self) {
        self.restart().await;
    }
}
