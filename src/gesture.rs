//! Gesture input adapter: turns drag releases and wheel ticks into at most
//! one navigation call per physical gesture.
//!
//! Timestamps are passed in by the caller so the cooldown window can be
//! exercised without a clock.

use std::time::{Duration, Instant};

use crate::config::GestureConfig;
use crate::flow::{FlowStep, StepSequencer};

/// Horizontal drag at release time. Positive values point right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub offset: f32,
    pub velocity: f32,
}

/// One wheel event. Positive `delta_y` scrolls down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSample {
    pub delta_y: f32,
}

/// Navigation requested by a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Previous,
}

/// Why a gesture produced no navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureRejection {
    /// Drag released below both thresholds; the view snaps back.
    Cancelled,
    /// Wheel delta too small to be intentional.
    Noise,
    /// Inside the cooldown window of an earlier wheel trigger.
    CoolingDown,
}

pub type GestureResult = Result<NavIntent, GestureRejection>;

/// `locked_until` timer guarding wheel input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cooldown {
    locked_until: Option<Instant>,
}

impl Cooldown {
    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    pub fn lock(&mut self, now: Instant, window: Duration) {
        self.locked_until = Some(now + window);
    }

    pub fn locked_until(&self) -> Option<Instant> {
        self.locked_until
    }

    pub fn clear(&mut self) {
        self.locked_until = None;
    }
}

/// Converts raw gesture samples into sequencer calls.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    config: GestureConfig,
    cooldown: Cooldown,
}

impl GestureAdapter {
    /// Create an adapter with no cooldown running.
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            cooldown: Cooldown::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Decide what a drag release means. Offset wins when it crosses its
    /// threshold; otherwise a fast flick decides by velocity.
    pub fn interpret_drag(&self, sample: DragSample) -> GestureResult {
        let signal = if sample.offset.abs() > self.config.offset_threshold {
            sample.offset
        } else if sample.velocity.abs() > self.config.velocity_threshold {
            sample.velocity
        } else {
            return Err(GestureRejection::Cancelled);
        };

        // Rightward drags pull the previous screen in.
        if signal > 0.0 {
            Ok(NavIntent::Previous)
        } else {
            Ok(NavIntent::Next)
        }
    }

    /// Decide what a wheel tick means, arming the cooldown when it fires.
    pub fn interpret_wheel(&mut self, sample: WheelSample, now: Instant) -> GestureResult {
        if self.cooldown.is_locked(now) {
            return Err(GestureRejection::CoolingDown);
        }
        if sample.delta_y.abs() < self.config.wheel_noise_threshold {
            return Err(GestureRejection::Noise);
        }

        self.cooldown.lock(now, self.config.wheel_cooldown);
        if sample.delta_y > 0.0 {
            Ok(NavIntent::Next)
        } else {
            Ok(NavIntent::Previous)
        }
    }

    /// Handle a drag release against `seq`.
    pub fn on_drag_release<S: FlowStep>(
        &self,
        seq: &mut StepSequencer<S>,
        sample: DragSample,
    ) -> GestureResult {
        let intent = self.interpret_drag(sample)?;
        apply(seq, intent);
        Ok(intent)
    }

    /// Handle a wheel event against `seq`.
    pub fn on_wheel<S: FlowStep>(
        &mut self,
        seq: &mut StepSequencer<S>,
        sample: WheelSample,
        now: Instant,
    ) -> GestureResult {
        let intent = self.interpret_wheel(sample, now)?;
        apply(seq, intent);
        Ok(intent)
    }

    pub fn reset(&mut self) {
        self.cooldown.clear();
    }
}

/// Forward an intent to the sequencer; bounds are the sequencer's concern.
pub fn apply<S: FlowStep>(seq: &mut StepSequencer<S>, intent: NavIntent) -> bool {
    match intent {
        NavIntent::Next => seq.next(),
        NavIntent::Previous => seq.previous(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{CardStep, JourneyStep};

    fn adapter() -> GestureAdapter {
        GestureAdapter::new(GestureConfig::default())
    }

    #[test]
    fn drag_past_offset_goes_back() {
        let mut seq = StepSequencer::<JourneyStep>::new();
        seq.next();
        let result = adapter().on_drag_release(
            &mut seq,
            DragSample {
                offset: 70.0,
                velocity: 0.0,
            },
        );
        assert_eq!(result, Ok(NavIntent::Previous));
        assert_eq!(seq.current(), JourneyStep::Welcome);
    }

    #[test]
    fn leftward_drag_goes_forward() {
        let mut seq = StepSequencer::<JourneyStep>::new();
        let result = adapter().on_drag_release(
            &mut seq,
            DragSample {
                offset: -80.0,
                velocity: 0.0,
            },
        );
        assert_eq!(result, Ok(NavIntent::Next));
        assert_eq!(seq.current(), JourneyStep::Choose);
    }

    #[test]
    fn small_slow_drag_is_cancelled() {
        let mut seq = StepSequencer::<CardStep>::new();
        seq.next();
        let before = seq.state().clone();
        let result = adapter().on_drag_release(
            &mut seq,
            DragSample {
                offset: 50.0,
                velocity: -499.0,
            },
        );
        assert_eq!(result, Err(GestureRejection::Cancelled));
        assert_eq!(seq.state(), &before);
    }

    #[test]
    fn fast_flick_uses_velocity() {
        let result = adapter().interpret_drag(DragSample {
            offset: -10.0,
            velocity: 900.0,
        });
        assert_eq!(result, Ok(NavIntent::Previous));
    }

    #[test]
    fn wheel_cooldown_allows_one_transition() {
        let mut gestures = adapter();
        let mut seq = StepSequencer::<CardStep>::new();
        let t0 = Instant::now();

        let first = gestures.on_wheel(&mut seq, WheelSample { delta_y: 40.0 }, t0);
        let second = gestures.on_wheel(
            &mut seq,
            WheelSample { delta_y: 40.0 },
            t0 + Duration::from_millis(100),
        );

        assert_eq!(first, Ok(NavIntent::Next));
        assert_eq!(second, Err(GestureRejection::CoolingDown));
        assert_eq!(seq.current(), CardStep::Moment);
    }

    #[test]
    fn wheel_fires_again_after_window() {
        let mut gestures = adapter();
        let mut seq = StepSequencer::<CardStep>::new();
        let t0 = Instant::now();
        let window = gestures.config().wheel_cooldown;

        gestures.on_wheel(&mut seq, WheelSample { delta_y: 30.0 }, t0).unwrap();
        gestures
            .on_wheel(&mut seq, WheelSample { delta_y: 30.0 }, t0 + window)
            .unwrap();
        assert_eq!(seq.current(), CardStep::Experience);
    }

    #[test]
    fn wheel_noise_does_not_arm_cooldown() {
        let mut gestures = adapter();
        let t0 = Instant::now();
        assert_eq!(
            gestures.interpret_wheel(WheelSample { delta_y: -5.0 }, t0),
            Err(GestureRejection::Noise)
        );
        assert!(!gestures.cooldown().is_locked(t0));
        assert_eq!(
            gestures.interpret_wheel(WheelSample { delta_y: -25.0 }, t0),
            Ok(NavIntent::Previous)
        );
    }

    #[test]
    fn gesture_past_bounds_is_noop() {
        let mut seq = StepSequencer::<JourneyStep>::new();
        let result = adapter().on_drag_release(
            &mut seq,
            DragSample {
                offset: 120.0,
                velocity: 0.0,
            },
        );
        assert_eq!(result, Ok(NavIntent::Previous));
        assert_eq!(seq.current(), JourneyStep::Welcome);
    }

    #[test]
    fn cooldown_timer() {
        let mut cooldown = Cooldown::default();
        let t0 = Instant::now();
        assert!(!cooldown.is_locked(t0));
        cooldown.lock(t0, Duration::from_millis(520));
        assert!(cooldown.is_locked(t0 + Duration::from_millis(519)));
        assert!(!cooldown.is_locked(t0 + Duration::from_millis(520)));
        cooldown.clear();
        assert!(cooldown.locked_until().is_none());
    }
}
