//! Screen transitions keyed by step identity.
//!
//! The sequencer changes state synchronously; only the visual transition is
//! asynchronous. The renderer tracks which screen is entering so that the
//! outgoing screen never receives input and a late completion for an older
//! transition cannot change what is displayed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::step::{Direction, FlowStep};

/// Visitor's motion preference, read once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    #[default]
    Full,
    Reduced,
}

/// Spring used for the horizontal slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
}

/// Everything a view layer needs to animate one screen change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition<S: FlowStep> {
    /// Transition identity; equal to the incoming step.
    pub key: S,
    pub outgoing: Option<S>,
    pub direction: Direction,
    /// Where the incoming screen starts, as a fraction of the width.
    pub enter_from: f32,
    /// Where the outgoing screen ends, as a fraction of the width.
    pub exit_to: f32,
    /// `None` when motion is reduced.
    pub spring: Option<Spring>,
    pub fade: Duration,
}

impl<S: FlowStep> Transition<S> {
    pub fn is_instant(&self) -> bool {
        self.spring.is_none() && self.fade.is_zero()
    }
}

const SLIDE_SPRING: Spring = Spring {
    stiffness: 300.0,
    damping: 30.0,
};

const FADE: Duration = Duration::from_millis(200);

/// Lifecycle of the displayed screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<S: FlowStep> {
    Settled(S),
    Transitioning { from: S, to: S },
}

/// Tracks the displayed screen and the transition in progress.
#[derive(Debug, Clone)]
pub struct ScreenRenderer<S: FlowStep> {
    motion: MotionPreference,
    phase: Phase<S>,
}

impl<S: FlowStep> ScreenRenderer<S> {
    pub fn new(initial: S, motion: MotionPreference) -> Self {
        Self {
            motion,
            phase: Phase::Settled(initial),
        }
    }

    pub fn motion(&self) -> MotionPreference {
        self.motion
    }

    pub fn phase(&self) -> Phase<S> {
        self.phase
    }

    /// The screen that owns content and input right now.
    pub fn active(&self) -> S {
        match self.phase {
            Phase::Settled(step) => step,
            Phase::Transitioning { to, .. } => to,
        }
    }

    /// Begin showing `step`. A new transition may start before the previous
    /// one finishes; the newest target always wins.
    ///
    /// Returns `None` when `step` is already the active screen.
    pub fn show(&mut self, step: S, direction: Direction) -> Option<Transition<S>> {
        let from = self.active();
        if from == step {
            return None;
        }

        let sign = f32::from(direction.sign());
        let (spring, fade) = match self.motion {
            MotionPreference::Full => (Some(SLIDE_SPRING), FADE),
            MotionPreference::Reduced => (None, Duration::ZERO),
        };

        self.phase = if spring.is_none() {
            Phase::Settled(step)
        } else {
            Phase::Transitioning { from, to: step }
        };

        Some(Transition {
            key: step,
            outgoing: Some(from),
            direction,
            enter_from: sign,
            exit_to: -sign,
            spring,
            fade,
        })
    }

    /// Report that the transition keyed `key` finished animating. Stale keys
    /// are ignored. Returns whether the renderer settled.
    pub fn complete(&mut self, key: S) -> bool {
        match self.phase {
            Phase::Transitioning { to, .. } if to == key => {
                self.phase = Phase::Settled(key);
                true
            }
            _ => {
                tracing::trace!(key = %key, "Ignoring stale transition completion");
                false
            }
        }
    }

    /// Only the incoming (or settled) screen accepts input.
    pub fn accepts_input(&self, step: S) -> bool {
        self.active() == step
    }

    /// Drop any transition in progress and show `step` immediately.
    pub fn reset(&mut self, step: S) {
        self.phase = Phase::Settled(step);
    }
}
