//! Feature cards and how a visitor's choice reorders them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

use super::selection::ChoiceValue;

/// Walkthrough "what matters most right now" answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    #[default]
    Landed,
    Room,
    Rides,
    Essentials,
    People,
}

impl Situation {
    pub const ALL: [Self; 5] = [
        Self::Landed,
        Self::Room,
        Self::Rides,
        Self::Essentials,
        Self::People,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Landed => "Just landed in the U.S.",
            Self::Room => "Looking for a room",
            Self::Rides => "Need rides / transport",
            Self::Essentials => "Need essentials",
            Self::People => "Want to meet people",
        }
    }

    /// Features shown on the explore chapter, most relevant first.
    pub fn visible_features(self) -> [FeatureKey; 3] {
        match self {
            Self::Room => [FeatureKey::Rooms, FeatureKey::Community, FeatureKey::Alerts],
            Self::Rides => [FeatureKey::Rides, FeatureKey::Community, FeatureKey::Alerts],
            Self::Essentials => [
                FeatureKey::Marketplace,
                FeatureKey::Community,
                FeatureKey::Alerts,
            ],
            Self::Landed | Self::People => {
                [FeatureKey::Community, FeatureKey::Rooms, FeatureKey::Alerts]
            }
        }
    }

    /// Feature expanded when the explore chapter opens.
    pub fn initial_feature(self) -> FeatureKey {
        self.visible_features()[0]
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Landed => "landed",
            Self::Room => "room",
            Self::Rides => "rides",
            Self::Essentials => "essentials",
            Self::People => "people",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Situation {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.to_string() == s.trim())
            .ok_or_else(|| FlowError::UnknownChoice(s.trim().to_string()))
    }
}

/// A product feature card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    #[serde(alias = "housing")]
    Rooms,
    Rides,
    Marketplace,
    Community,
    Alerts,
}

impl FeatureKey {
    pub const ALL: [Self; 5] = [
        Self::Rooms,
        Self::Rides,
        Self::Marketplace,
        Self::Community,
        Self::Alerts,
    ];

    pub fn card(self) -> &'static FeatureCard {
        match self {
            Self::Rooms => &ROOMS,
            Self::Rides => &RIDES,
            Self::Marketplace => &MARKETPLACE,
            Self::Community => &COMMUNITY,
            Self::Alerts => &ALERTS,
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rooms => "rooms",
            Self::Rides => "rides",
            Self::Marketplace => "marketplace",
            Self::Community => "community",
            Self::Alerts => "alerts",
        };
        write!(f, "{s}")
    }
}

impl FromStr for FeatureKey {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "housing" => Ok(Self::Rooms),
            other => Self::ALL
                .into_iter()
                .find(|k| k.to_string() == other)
                .ok_or_else(|| FlowError::UnknownFeature(other.to_string())),
        }
    }
}

/// Static content of a feature card; the back face lists the before/after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
    pub problems: &'static [&'static str],
    pub solutions: &'static [&'static str],
}

static ROOMS: FeatureCard = FeatureCard {
    title: "Housing",
    description: "Find trusted rooms & rentals",
    problems: &["Facebook groups", "Scams and fake listings", "No verification"],
    solutions: &[
        "Verified listings only",
        "Real people, real places",
        "Location-based matching",
    ],
};

static RIDES: FeatureCard = FeatureCard {
    title: "Rides",
    description: "Share rides, save money",
    problems: &["Uber is expensive", "Can't find ride buddies", "Unsafe random drivers"],
    solutions: &[
        "Split costs with verified students",
        "Matched by route & timing",
        "Built-in messaging",
    ],
};

static MARKETPLACE: FeatureCard = FeatureCard {
    title: "Essentials",
    description: "Buy & sell what you need",
    problems: &["Need to buy everything new", "Craigslist feels sketchy"],
    solutions: &["Buy/sell within your community", "Local pickup only"],
};

static COMMUNITY: FeatureCard = FeatureCard {
    title: "Community",
    description: "Connect with people like you",
    problems: &["Feeling isolated", "Don't know anyone yet", "Hard to meet locals"],
    solutions: &[
        "Shared experience groups",
        "Location-based communities",
        "Real relationships, not networking",
    ],
};

static ALERTS: FeatureCard = FeatureCard {
    title: "Alerts",
    description: "Know what matters, when it matters",
    problems: &["Missed deadlines", "Information scattered everywhere"],
    solutions: &["Timely local reminders", "One place for what's next"],
};

/// How the experience screen frames itself for a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MomentFraming {
    pub headline: &'static str,
    pub primary: FeatureKey,
    /// The four experience cards, most relevant first.
    pub order: [FeatureKey; 4],
}

/// Framing for the experience screen. No selection frames as `landed`.
pub fn moment_framing(choice: Option<ChoiceValue>) -> MomentFraming {
    use FeatureKey::*;
    match choice.unwrap_or(ChoiceValue::Landed) {
        ChoiceValue::Landed => MomentFraming {
            headline: "Just landed? Here's what usually matters first",
            primary: Rooms,
            order: [Rooms, Rides, Marketplace, Community],
        },
        ChoiceValue::Housing => MomentFraming {
            headline: "Looking for housing? Here's how Setly helps",
            primary: Rooms,
            order: [Rooms, Community, Marketplace, Rides],
        },
        ChoiceValue::Essentials => MomentFraming {
            headline: "Getting settled? Here's what you need",
            primary: Marketplace,
            order: [Marketplace, Rides, Rooms, Community],
        },
        ChoiceValue::Community => MomentFraming {
            headline: "Building connections? Here's how we help",
            primary: Community,
            order: [Community, Rooms, Rides, Marketplace],
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_framing_is_a_permutation() {
        for choice in ChoiceValue::ALL {
            let framing = moment_framing(Some(choice));
            let unique: HashSet<_> = framing.order.iter().collect();
            assert_eq!(unique.len(), 4, "duplicate card for {choice}");
            assert!(!framing.order.contains(&FeatureKey::Alerts));
            assert_eq!(framing.order[0], framing.primary);
        }
    }

    #[test]
    fn no_selection_frames_as_landed() {
        assert_eq!(moment_framing(None), moment_framing(Some(ChoiceValue::Landed)));
    }

    #[test]
    fn community_leads_with_community() {
        let framing = moment_framing(Some(ChoiceValue::Community));
        assert_eq!(framing.order[0], FeatureKey::Community);
        assert!(framing.headline.starts_with("Building connections"));
    }

    #[test]
    fn situation_mapping() {
        assert_eq!(Situation::Room.initial_feature(), FeatureKey::Rooms);
        assert_eq!(Situation::Rides.initial_feature(), FeatureKey::Rides);
        assert_eq!(Situation::Essentials.initial_feature(), FeatureKey::Marketplace);
        assert_eq!(Situation::People.initial_feature(), FeatureKey::Community);
        assert_eq!(
            Situation::Landed.visible_features(),
            [FeatureKey::Community, FeatureKey::Rooms, FeatureKey::Alerts]
        );
    }

    #[test]
    fn feature_parse_aliases() {
        assert_eq!("housing".parse::<FeatureKey>(), Ok(FeatureKey::Rooms));
        assert_eq!("alerts".parse::<FeatureKey>(), Ok(FeatureKey::Alerts));
        assert!("yachts".parse::<FeatureKey>().is_err());
        assert_eq!("people".parse::<Situation>(), Ok(Situation::People));
    }

    #[test]
    fn cards_have_content() {
        for key in FeatureKey::ALL {
            let card = key.card();
            assert!(!card.title.is_empty());
            assert!(!card.problems.is_empty());
            assert!(!card.solutions.is_empty());
        }
    }
}
