//! Step sequencer: the single source of truth for where the visitor is.
//!
//! Linear chain `ORDER[0] → … → ORDER[n-1]` plus an optional out-of-band
//! terminal step reachable only by `go_to`/`finish`. Every operation is total:
//! moving past either end is a no-op, never an error.

use std::collections::HashSet;

use serde::Serialize;

use super::progress;
use super::step::{Direction, FlowStep};

/// Observable state of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(bound(serialize = "S: Serialize, S::Choice: Serialize"))]
pub struct FlowState<S: FlowStep> {
    pub current_step: S,
    pub direction: Direction,
    /// Persists across later steps until the flow restarts.
    pub selection: Option<S::Choice>,
}

impl<S: FlowStep> Default for FlowState<S> {
    fn default() -> Self {
        Self {
            current_step: S::first(),
            direction: Direction::Forward,
            selection: None,
        }
    }
}

/// Owns the flow state and enforces legal movement.
#[derive(Debug, Clone)]
pub struct StepSequencer<S: FlowStep> {
    state: FlowState<S>,
    completed: HashSet<S>,
}

impl<S: FlowStep> Default for StepSequencer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FlowStep> StepSequencer<S> {
    /// Create a sequencer on the first step with nothing completed.
    pub fn new() -> Self {
        Self {
            state: FlowState::default(),
            completed: HashSet::new(),
        }
    }

    /// Snapshot of the observable state.
    pub fn state(&self) -> &FlowState<S> {
        &self.state
    }

    /// The step on screen.
    pub fn current(&self) -> S {
        self.state.current_step
    }

    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    pub fn selection(&self) -> Option<S::Choice> {
        self.state.selection
    }

    /// Index of the current step; `None` on the terminal step.
    pub fn index(&self) -> Option<usize> {
        self.state.current_step.index()
    }

    pub fn count(&self) -> usize {
        S::ORDER.len()
    }

    pub fn is_first(&self) -> bool {
        self.index() == Some(0)
    }

    pub fn is_last(&self) -> bool {
        self.index() == Some(self.count() - 1)
    }

    /// Advance one step. Marks the step being left as completed.
    /// Returns whether the state changed.
    pub fn next(&mut self) -> bool {
        let Some(idx) = self.index() else {
            return false;
        };
        if idx + 1 >= self.count() {
            return false;
        }
        let left = self.state.current_step;
        self.completed.insert(left);
        self.move_to(S::ORDER[idx + 1], Direction::Forward);
        true
    }

    /// Go back one step. From the terminal step this returns to its
    /// designated step rather than using index arithmetic.
    pub fn previous(&mut self) -> bool {
        match self.index() {
            Some(0) => false,
            Some(idx) => {
                self.move_to(S::ORDER[idx - 1], Direction::Backward);
                true
            }
            None => match self.state.current_step.return_step() {
                Some(target) => {
                    self.move_to(target, Direction::Backward);
                    true
                }
                None => false,
            },
        }
    }

    /// The "back" control shown on every screen.
    pub fn back(&mut self) -> bool {
        self.previous()
    }

    /// Jump to `step` unconditionally.
    ///
    /// Forward only when both steps are ordered and the target comes later.
    /// Jumping to the terminal step or leaving it counts as backward. A jump
    /// onto the current step changes nothing, direction included.
    pub fn go_to(&mut self, step: S) -> bool {
        if step == self.state.current_step {
            return false;
        }
        let direction = match (step.index(), self.index()) {
            (Some(target), Some(current)) if target > current => Direction::Forward,
            _ => Direction::Backward,
        };
        self.move_to(step, direction);
        true
    }

    /// The "continue" action of the final screen.
    ///
    /// Marks the current step completed and enters the terminal step, when the
    /// flow has one, moving forward.
    pub fn finish(&mut self) -> bool {
        if self.state.current_step.is_terminal() {
            return false;
        }
        self.completed.insert(self.state.current_step);
        match S::TERMINAL {
            Some(terminal) => {
                self.move_to(terminal, Direction::Forward);
                true
            }
            None => false,
        }
    }

    /// Store the committed selection. Does not move.
    pub fn set_selection(&mut self, choice: S::Choice) {
        self.state.selection = Some(choice);
    }

    /// Mark a step completed without moving (e.g. a feature was explored).
    pub fn mark_completed(&mut self, step: S) {
        self.completed.insert(step);
    }

    pub fn is_completed(&self, step: S) -> bool {
        self.completed.contains(&step)
    }

    /// Completed steps in flow order.
    pub fn completed_steps(&self) -> Vec<S> {
        S::all()
            .into_iter()
            .filter(|s| self.completed.contains(s))
            .collect()
    }

    /// Back to the first step with no selection and nothing completed.
    pub fn restart(&mut self) {
        self.state = FlowState::default();
        self.completed.clear();
    }

    /// `100 * index / (count - 1)`; `None` on the terminal step.
    pub fn progress_percent(&self) -> Option<f64> {
        self.index()
            .map(|idx| progress::percent(idx, self.count()))
    }

    fn move_to(&mut self, step: S, direction: Direction) {
        tracing::debug!(
            from = %self.state.current_step,
            to = %step,
            direction = %direction,
            "Flow step transition"
        );
        self.state.direction = direction;
        self.state.current_step = step;
    }
}
