//! Progress indicator: purely derived from the sequencer, never mutates it.

use serde::Serialize;

use super::sequencer::StepSequencer;
use super::step::FlowStep;

/// `100 * index / (count - 1)`, or 100 for a single-step flow.
pub fn percent(index: usize, count: usize) -> f64 {
    if count <= 1 {
        return 100.0;
    }
    100.0 * index as f64 / (count - 1) as f64
}

/// State of one marker on the segment bar or dot rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    Complete,
    Active,
    Upcoming,
}

/// One marker of the rail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker<S: FlowStep> {
    pub step: S,
    pub state: MarkerState,
}

/// Snapshot of the progress view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress<S: FlowStep> {
    pub index: usize,
    pub count: usize,
    pub percent: f64,
    pub markers: Vec<Marker<S>>,
}

impl<S: FlowStep> Progress<S> {
    /// Derive progress from the sequencer. `None` while on the terminal step,
    /// where the indicator is hidden.
    pub fn of(seq: &StepSequencer<S>) -> Option<Self> {
        let index = seq.index()?;
        let count = seq.count();
        let markers = S::ORDER
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                let state = if idx == index {
                    MarkerState::Active
                } else if idx < index || seq.is_completed(*step) {
                    MarkerState::Complete
                } else {
                    MarkerState::Upcoming
                };
                Marker { step: *step, state }
            })
            .collect();
        Some(Self {
            index,
            count,
            percent: percent(index, count),
            markers,
        })
    }

    /// "Step 2 of 3".
    pub fn label(&self) -> String {
        format!("Step {} of {}", self.index + 1, self.count)
    }

    /// Segment fill for the card-flow bar: every segment up to and including
    /// the active one is full.
    pub fn filled_segments(&self) -> Vec<bool> {
        (0..self.count).map(|idx| idx <= self.index).collect()
    }

    /// Text rendering of the segment bar, e.g. `[■■□□]`.
    pub fn bar(&self) -> String {
        let cells: String = self
            .filled_segments()
            .into_iter()
            .map(|full| if full { '■' } else { '□' })
            .collect();
        format!("[{cells}]")
    }
}
