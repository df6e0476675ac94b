//! Guided flow core: step sequencing, selection, progress and screen
//! transitions shared by the digital card flow and the homepage walkthrough.

pub mod features;
pub mod progress;
pub mod screens;
pub mod selection;
pub mod sequencer;
pub mod step;
pub mod transition;

pub use features::{FeatureKey, Situation, moment_framing};
pub use progress::Progress;
pub use screens::{RenderedScreen, ScreenSource, Theme};
pub use selection::{AdvancePolicy, ChoiceValue, SelectionOutcome};
pub use sequencer::{FlowState, StepSequencer};
pub use step::{CardStep, Direction, FlowStep, JourneyStep};
pub use transition::{MotionPreference, ScreenRenderer, Transition};
