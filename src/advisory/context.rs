//! Advisory context: what the visitor has done so far in this session.
//!
//! Feature and completed-step sets only ever grow; `reset` is the only way
//! to shrink them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::flow::{ChoiceValue, FeatureKey, FlowStep, Situation};

/// Accumulated context sent to the advisory generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvisoryContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_choice: Option<ChoiceValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situation: Option<Situation>,
    selected_features: BTreeSet<FeatureKey>,
    /// Keyed by position in the flow; the terminal step sorts last.
    completed_steps: BTreeMap<usize, String>,
}

impl AdvisoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entry_choice(&mut self, choice: ChoiceValue) {
        self.entry_choice = Some(choice);
    }

    pub fn set_situation(&mut self, situation: Situation) {
        self.situation = Some(situation);
    }

    pub fn set_current_step<S: FlowStep>(&mut self, step: S) {
        self.current_step = Some(step.to_string());
    }

    /// Record a viewed feature. Returns `true` if it was new.
    pub fn add_feature(&mut self, feature: FeatureKey) -> bool {
        self.selected_features.insert(feature)
    }

    /// Record a completed step. Returns `true` if it was new.
    pub fn complete_step<S: FlowStep>(&mut self, step: S) -> bool {
        let position = step.index().unwrap_or(S::ORDER.len());
        self.completed_steps
            .insert(position, step.to_string())
            .is_none()
    }

    /// Union in every step in `steps`.
    pub fn merge_completed<S: FlowStep>(&mut self, steps: impl IntoIterator<Item = S>) {
        for step in steps {
            self.complete_step(step);
        }
    }

    pub fn selected_features(&self) -> &BTreeSet<FeatureKey> {
        &self.selected_features
    }

    /// Completed step names in flow order.
    pub fn completed_steps(&self) -> Vec<&str> {
        self.completed_steps.values().map(String::as_str).collect()
    }

    pub fn has_completed<S: FlowStep>(&self, step: S) -> bool {
        let name = step.to_string();
        self.completed_steps.values().any(|s| *s == name)
    }

    /// Enough has happened to be worth a personalised line.
    pub fn is_meaningful(&self) -> bool {
        self.entry_choice.is_some() || self.situation.is_some() || !self.selected_features.is_empty()
    }

    /// Stable key used to skip redundant requests for an unchanged context.
    pub fn key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }

    /// "What I understand" summary shown beside the advisory line.
    pub fn insights(&self) -> Vec<String> {
        let mut insights = Vec::new();

        if let Some(choice) = self.entry_choice {
            let label = match choice {
                ChoiceValue::Landed => "You just arrived",
                ChoiceValue::Housing => "Housing is urgent",
                ChoiceValue::Essentials => "You need transport & essentials",
                ChoiceValue::Community => "You want to connect with people",
            };
            insights.push(label.to_string());
        }

        if let Some(situation) = self.situation {
            // Skip when it only repeats the entry choice.
            let repeats_entry = self
                .entry_choice
                .is_some_and(|c| c.to_string() == situation.to_string());
            if !repeats_entry {
                let label = match situation {
                    Situation::Landed => "Arrival support",
                    Situation::Room => "Verified housing",
                    Situation::Rides => "Transport options",
                    Situation::Essentials => "Local essentials",
                    Situation::People => "Community connections",
                };
                insights.push(label.to_string());
            }
        }

        match self.selected_features.len() {
            0 => {}
            1 => insights.push("Explored 1 feature".to_string()),
            n => insights.push(format!("Explored {n} features")),
        }

        insights
    }

    /// Forget everything; used on "start over".
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A flow choice that knows where it lands in the advisory context.
pub trait ContextChoice {
    fn record(self, ctx: &mut AdvisoryContext);
}

impl ContextChoice for ChoiceValue {
    fn record(self, ctx: &mut AdvisoryContext) {
        ctx.set_entry_choice(self);
    }
}

impl ContextChoice for Situation {
    fn record(self, ctx: &mut AdvisoryContext) {
        ctx.set_situation(self);
    }
}
