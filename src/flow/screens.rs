//! One parameterised screen record per step.
//!
//! Visual variants are a `Theme` parameter, not separate screens.

use serde::Serialize;

use super::features::{FeatureKey, Situation, moment_framing};
use super::selection::ChoiceValue;
use super::step::{CardStep, FlowStep, JourneyStep};

/// Static copy and controls of a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenContent {
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Label of the primary (continue) control, if the screen has one.
    pub primary_action: Option<&'static str>,
    pub back_allowed: bool,
    pub shows_progress: bool,
}

/// Dynamic part of a screen, driven by the flow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenBody {
    Plain,
    /// Selectable options as `(value, label)`, with the current selection.
    Choices {
        options: Vec<(String, &'static str)>,
        selected: Option<String>,
    },
    /// Feature cards in display order.
    Features {
        headline: &'static str,
        cards: Vec<FeatureKey>,
    },
}

/// Visual style variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Full-screen mobile card flow.
    #[default]
    Card,
    /// Homepage "living canvas" with alternating accents.
    Canvas,
}

/// Colour tokens resolved for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeTokens {
    pub background: &'static str,
    pub accent: &'static str,
}

impl Theme {
    pub fn tokens(self, index: Option<usize>) -> ThemeTokens {
        match self {
            Self::Card => ThemeTokens {
                background: "surface",
                accent: "primary-blue",
            },
            Self::Canvas => ThemeTokens {
                background: "canvas",
                accent: if index.unwrap_or(0) % 2 == 0 {
                    "brand-gold"
                } else {
                    "brand-midnight"
                },
            },
        }
    }
}

/// A step that knows how to describe its screen.
pub trait ScreenSource: FlowStep {
    fn content(self) -> ScreenContent;

    fn body(self, selection: Option<Self::Choice>) -> ScreenBody {
        let _ = selection;
        ScreenBody::Plain
    }
}

/// What the view layer paints for the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedScreen<S: FlowStep> {
    pub step: S,
    pub content: ScreenContent,
    pub body: ScreenBody,
    pub tokens: ThemeTokens,
}

/// Map a step (plus selection) to its panel.
pub fn render<S: ScreenSource>(
    step: S,
    selection: Option<S::Choice>,
    theme: Theme,
) -> RenderedScreen<S> {
    RenderedScreen {
        step,
        content: step.content(),
        body: step.body(selection),
        tokens: theme.tokens(step.index()),
    }
}

impl ScreenSource for CardStep {
    fn content(self) -> ScreenContent {
        let (title, subtitle, primary_action) = match self {
            Self::Identity => (
                "Setly",
                "From landing to belonging.",
                Some("Begin"),
            ),
            Self::Moment => (
                "The moment",
                "Which situation feels most familiar?",
                Some("Continue"),
            ),
            Self::Experience => (
                "The experience",
                "What changes with the right help.",
                Some("Continue"),
            ),
            Self::Difference => (
                "The difference",
                "Verified, local, and built around people.",
                Some("Continue"),
            ),
            Self::Founder => (
                "Why we're building this",
                "Started by someone who landed here too.",
                Some("Continue"),
            ),
            Self::Story => (
                "The story",
                "You don't have to figure this out alone.",
                Some("Join the waitlist"),
            ),
            Self::Waitlist => (
                "Join the waitlist",
                "Early access. No commitment.",
                None,
            ),
        };
        ScreenContent {
            title,
            subtitle,
            primary_action,
            back_allowed: self != Self::Identity,
            shows_progress: !self.is_terminal(),
        }
    }

    fn body(self, selection: Option<ChoiceValue>) -> ScreenBody {
        match self {
            Self::Moment => ScreenBody::Choices {
                options: ChoiceValue::ALL
                    .into_iter()
                    .map(|c| (c.to_string(), c.title()))
                    .collect(),
                selected: selection.map(|c| c.to_string()),
            },
            Self::Experience => {
                let framing = moment_framing(selection);
                ScreenBody::Features {
                    headline: framing.headline,
                    cards: framing.order.to_vec(),
                }
            }
            _ => ScreenBody::Plain,
        }
    }
}

impl ScreenSource for JourneyStep {
    fn content(self) -> ScreenContent {
        let (title, subtitle, primary_action) = match self {
            Self::Welcome => (
                "From landing to belonging",
                "The moment after you land, when you don't know where to start.",
                Some("Continue"),
            ),
            Self::Choose => (
                "Start where you are",
                "What matters most right now?",
                None,
            ),
            Self::Explore => (
                "What changes for you",
                "What changes with the right help.",
                None,
            ),
        };
        ScreenContent {
            title,
            subtitle,
            primary_action,
            back_allowed: self != Self::Welcome,
            shows_progress: true,
        }
    }

    fn body(self, selection: Option<Situation>) -> ScreenBody {
        match self {
            Self::Choose => ScreenBody::Choices {
                options: Situation::ALL
                    .into_iter()
                    .map(|s| (s.to_string(), s.title()))
                    .collect(),
                selected: selection.map(|s| s.to_string()),
            },
            Self::Explore => ScreenBody::Features {
                headline: "What changes with the right help",
                cards: selection.unwrap_or_default().visible_features().to_vec(),
            },
            Self::Welcome => ScreenBody::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_follows_selection() {
        let screen = render(CardStep::Experience, Some(ChoiceValue::Essentials), Theme::Card);
        match screen.body {
            ScreenBody::Features { cards, .. } => {
                assert_eq!(cards[0], FeatureKey::Marketplace);
                assert_eq!(cards.len(), 4);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn moment_marks_selected_option() {
        let screen = render(CardStep::Moment, Some(ChoiceValue::Housing), Theme::Card);
        match screen.body {
            ScreenBody::Choices { options, selected } => {
                assert_eq!(options.len(), 4);
                assert_eq!(selected.as_deref(), Some("housing"));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn waitlist_hides_progress() {
        let content = CardStep::Waitlist.content();
        assert!(!content.shows_progress);
        assert!(content.back_allowed);
        assert!(!CardStep::Identity.content().back_allowed);
    }

    #[test]
    fn explore_defaults_to_landed_features() {
        let screen = render(JourneyStep::Explore, None, Theme::Canvas);
        assert_eq!(
            screen.body,
            ScreenBody::Features {
                headline: "What changes with the right help",
                cards: Situation::Landed.visible_features().to_vec(),
            }
        );
    }

    #[test]
    fn canvas_alternates_accents() {
        assert_eq!(Theme::Canvas.tokens(Some(0)).accent, "brand-gold");
        assert_eq!(Theme::Canvas.tokens(Some(1)).accent, "brand-midnight");
        assert_eq!(Theme::Card.tokens(None).accent, "primary-blue");
    }
}
