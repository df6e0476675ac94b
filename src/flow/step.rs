//! Step sets for the guided flows.
//!
//! A flow is a closed enumeration of steps with a fixed linear order and, at
//! most, one out-of-band terminal step that is reachable only by explicit
//! navigation.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::features::Situation;
use super::selection::{AdvancePolicy, ChoiceValue};

/// Direction of travel between two steps. Only affects animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// +1 for forward, -1 for backward.
    pub fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
        }
    }
}

/// A step of a guided flow.
pub trait FlowStep:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Value committed on this flow's selection screen.
    type Choice: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Steps reachable by `next`/`previous`, in order. Never empty.
    const ORDER: &'static [Self];

    /// The out-of-band terminal step, if the flow has one.
    const TERMINAL: Option<Self> = None;

    /// Where "back" leads from an out-of-band step.
    fn return_step(self) -> Option<Self> {
        None
    }

    /// How a selection made on this step is relayed. `None` if the step has no
    /// selection.
    fn selection_policy(self) -> Option<AdvancePolicy> {
        None
    }

    /// Position in `ORDER`; `None` for the terminal step.
    fn index(self) -> Option<usize> {
        Self::ORDER.iter().position(|s| *s == self)
    }

    fn is_terminal(self) -> bool {
        Self::TERMINAL == Some(self)
    }

    fn first() -> Self {
        Self::ORDER[0]
    }

    fn last() -> Self {
        Self::ORDER[Self::ORDER.len() - 1]
    }

    /// Every step including the terminal one.
    fn all() -> Vec<Self> {
        let mut steps = Self::ORDER.to_vec();
        steps.extend(Self::TERMINAL);
        steps
    }

    /// Look up a step by its display name.
    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all().into_iter().find(|s| s.to_string() == name)
    }
}

/// Screens of the digital card flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStep {
    Identity,
    Moment,
    Experience,
    Difference,
    Founder,
    Story,
    Waitlist,
}

impl FlowStep for CardStep {
    type Choice = ChoiceValue;

    const ORDER: &'static [Self] = &[
        Self::Identity,
        Self::Moment,
        Self::Experience,
        Self::Difference,
        Self::Founder,
        Self::Story,
    ];

    const TERMINAL: Option<Self> = Some(Self::Waitlist);

    fn return_step(self) -> Option<Self> {
        match self {
            Self::Waitlist => Some(Self::Story),
            _ => None,
        }
    }

    fn selection_policy(self) -> Option<AdvancePolicy> {
        match self {
            Self::Moment => Some(AdvancePolicy::ConfirmRequired),
            _ => None,
        }
    }
}

impl fmt::Display for CardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Identity => "identity",
            Self::Moment => "moment",
            Self::Experience => "experience",
            Self::Difference => "difference",
            Self::Founder => "founder",
            Self::Story => "story",
            Self::Waitlist => "waitlist",
        };
        write!(f, "{s}")
    }
}

/// Chapters of the homepage walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStep {
    Welcome,
    Choose,
    Explore,
}

impl FlowStep for JourneyStep {
    type Choice = Situation;

    const ORDER: &'static [Self] = &[Self::Welcome, Self::Choose, Self::Explore];

    fn selection_policy(self) -> Option<AdvancePolicy> {
        match self {
            Self::Choose => Some(AdvancePolicy::AutoAdvance),
            _ => None,
        }
    }
}

impl fmt::Display for JourneyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Choose => "choose",
            Self::Explore => "explore",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waitlist_is_out_of_band() {
        assert_eq!(CardStep::Waitlist.index(), None);
        assert!(CardStep::Waitlist.is_terminal());
        assert!(!CardStep::ORDER.contains(&CardStep::Waitlist));
        assert_eq!(CardStep::Waitlist.return_step(), Some(CardStep::Story));
    }

    #[test]
    fn ordered_steps_have_indices() {
        for (idx, step) in CardStep::ORDER.iter().enumerate() {
            assert_eq!(step.index(), Some(idx));
            assert!(!step.is_terminal());
        }
        assert_eq!(JourneyStep::Explore.index(), Some(2));
        assert_eq!(JourneyStep::TERMINAL, None);
    }

    #[test]
    fn display_matches_serde() {
        for step in CardStep::all() {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json, "mismatch for {step:?}");
        }
        for step in JourneyStep::all() {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json, "mismatch for {step:?}");
        }
    }

    #[test]
    fn from_name_covers_terminal() {
        assert_eq!(CardStep::from_name("waitlist"), Some(CardStep::Waitlist));
        assert_eq!(CardStep::from_name(" story "), Some(CardStep::Story));
        assert_eq!(CardStep::from_name("checkout"), None);
        assert_eq!(JourneyStep::from_name("choose"), Some(JourneyStep::Choose));
    }

    #[test]
    fn first_and_last() {
        assert_eq!(CardStep::first(), CardStep::Identity);
        assert_eq!(CardStep::last(), CardStep::Story);
        assert_eq!(JourneyStep::last(), JourneyStep::Explore);
    }

    #[test]
    fn direction_sign() {
        assert_eq!(Direction::Forward.sign(), 1);
        assert_eq!(Direction::Backward.sign(), -1);
        assert_eq!(Direction::default(), Direction::Forward);
    }
}
