//! Selection relay: forwards a committed choice into the flow state and
//! advances according to the step's explicit policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

use super::sequencer::StepSequencer;
use super::step::FlowStep;

/// "Which moment best describes you" on the card flow, also the entry choice
/// of the walkthrough overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceValue {
    Landed,
    Housing,
    #[serde(alias = "rides")]
    Essentials,
    Community,
}

impl ChoiceValue {
    pub const ALL: [Self; 4] = [Self::Landed, Self::Housing, Self::Essentials, Self::Community];

    /// Card title shown on the moment screen.
    pub fn title(self) -> &'static str {
        match self {
            Self::Landed => "Just landed in the U.S.",
            Self::Housing => "Looking for housing",
            Self::Essentials => "Need rides / essentials",
            Self::Community => "Don't want to feel alone",
        }
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Landed => "landed",
            Self::Housing => "housing",
            Self::Essentials => "essentials",
            Self::Community => "community",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ChoiceValue {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "landed" => Ok(Self::Landed),
            "housing" => Ok(Self::Housing),
            "essentials" | "rides" => Ok(Self::Essentials),
            "community" => Ok(Self::Community),
            other => Err(FlowError::UnknownChoice(other.to_string())),
        }
    }
}

/// What happens after a choice is committed on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Selecting moves to the next step immediately.
    AutoAdvance,
    /// Selecting enables a separate continue control.
    ConfirmRequired,
}

/// Result of relaying a selection or confirm action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Selection stored and the flow advanced.
    Advanced,
    /// Selection stored; waiting for the continue control.
    AwaitingConfirm,
    /// The current step takes no selection, or confirm had nothing to confirm.
    Ignored,
}

/// Commit `choice` on the current step.
pub fn commit<S: FlowStep>(seq: &mut StepSequencer<S>, choice: S::Choice) -> SelectionOutcome {
    let step = seq.current();
    let Some(policy) = step.selection_policy() else {
        tracing::debug!(step = %step, choice = %choice, "Selection ignored on step without a choice");
        return SelectionOutcome::Ignored;
    };

    seq.set_selection(choice);
    tracing::info!(step = %step, choice = %choice, policy = ?policy, "Selection committed");

    match policy {
        AdvancePolicy::AutoAdvance => {
            seq.mark_completed(step);
            seq.next();
            SelectionOutcome::Advanced
        }
        AdvancePolicy::ConfirmRequired => SelectionOutcome::AwaitingConfirm,
    }
}

/// The continue control of a `ConfirmRequired` step. Disabled (ignored) until
/// a selection exists.
pub fn confirm<S: FlowStep>(seq: &mut StepSequencer<S>) -> SelectionOutcome {
    let step = seq.current();
    if step.selection_policy() != Some(AdvancePolicy::ConfirmRequired) {
        return SelectionOutcome::Ignored;
    }
    if seq.selection().is_none() {
        tracing::debug!(step = %step, "Continue pressed with nothing selected");
        return SelectionOutcome::Ignored;
    }
    seq.next();
    SelectionOutcome::Advanced
}

/// Whether the continue control of the current step is enabled.
pub fn can_confirm<S: FlowStep>(seq: &StepSequencer<S>) -> bool {
    match seq.current().selection_policy() {
        Some(AdvancePolicy::ConfirmRequired) => seq.selection().is_some(),
        Some(AdvancePolicy::AutoAdvance) => false,
        None => !seq.is_last(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::features::Situation;
    use crate::flow::step::{CardStep, JourneyStep};

    #[test]
    fn moment_requires_confirm() {
        let mut seq = StepSequencer::<CardStep>::new();
        seq.next();
        assert_eq!(seq.current(), CardStep::Moment);
        assert!(!can_confirm(&seq));
        assert_eq!(confirm(&mut seq), SelectionOutcome::Ignored);
        assert_eq!(seq.current(), CardStep::Moment);

        assert_eq!(
            commit(&mut seq, ChoiceValue::Community),
            SelectionOutcome::AwaitingConfirm
        );
        assert_eq!(seq.current(), CardStep::Moment);
        assert!(can_confirm(&seq));

        assert_eq!(confirm(&mut seq), SelectionOutcome::Advanced);
        assert_eq!(seq.current(), CardStep::Experience);
        assert_eq!(seq.selection(), Some(ChoiceValue::Community));
    }

    #[test]
    fn reselecting_replaces_value() {
        let mut seq = StepSequencer::<CardStep>::new();
        seq.next();
        commit(&mut seq, ChoiceValue::Landed);
        commit(&mut seq, ChoiceValue::Housing);
        assert_eq!(seq.selection(), Some(ChoiceValue::Housing));
    }

    #[test]
    fn choose_auto_advances() {
        let mut seq = StepSequencer::<JourneyStep>::new();
        seq.next();
        assert_eq!(commit(&mut seq, Situation::Rides), SelectionOutcome::Advanced);
        assert_eq!(seq.current(), JourneyStep::Explore);
        assert!(seq.is_completed(JourneyStep::Choose));
        assert_eq!(seq.selection(), Some(Situation::Rides));
    }

    #[test]
    fn selection_ignored_off_choice_step() {
        let mut seq = StepSequencer::<CardStep>::new();
        assert_eq!(commit(&mut seq, ChoiceValue::Landed), SelectionOutcome::Ignored);
        assert_eq!(seq.selection(), None);
        assert_eq!(seq.current(), CardStep::Identity);
    }

    #[test]
    fn parse_accepts_rides_alias() {
        assert_eq!("rides".parse::<ChoiceValue>(), Ok(ChoiceValue::Essentials));
        assert_eq!("housing".parse::<ChoiceValue>(), Ok(ChoiceValue::Housing));
        assert!("boats".parse::<ChoiceValue>().is_err());
        let parsed: ChoiceValue = serde_json::from_str("\"rides\"").unwrap();
        assert_eq!(parsed, ChoiceValue::Essentials);
    }
}
