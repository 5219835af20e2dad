//! Reset sequencing.
//!
//! Reset is held asserted for a fixed window measured from simulation start
//! and released afterwards. The decision is only applied while the clock is
//! low, so `resetn` never changes on the edge where the DUT samples it.

use serde::{Deserialize, Serialize};

use crate::clock::ClockToggler;
use crate::dut::DutInputs;
use crate::types::SimTime;

/// Open window `(after, before)` during which reset is asserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetWindow {
    /// Reset asserts strictly after this tick
    #[serde(default = "default_after")]
    pub after: SimTime,
    /// Reset releases from this tick on
    #[serde(default = "default_before")]
    pub before: SimTime,
}

fn default_after() -> SimTime {
    1
}

fn default_before() -> SimTime {
    10
}

impl Default for ResetWindow {
    fn default() -> Self {
        Self {
            after: default_after(),
            before: default_before(),
        }
    }
}

impl ResetWindow {
    /// True when `time` lies strictly inside the window.
    pub fn contains(&self, time: SimTime) -> bool {
        time > self.after && time < self.before
    }

    /// True if no tick can ever fall inside the window.
    pub fn is_empty(&self) -> bool {
        self.before <= self.after.saturating_add(1)
    }
}

/// Reset line state as decided by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetState {
    Asserted,
    Deasserted,
}

/// Two-state reset sequencer driving the active-low `resetn` input.
#[derive(Clone, Debug)]
pub struct ResetSequencer {
    window: ResetWindow,
    state: ResetState,
    /// Tick of the last decision, if any has been made yet
    last_update: Option<SimTime>,
}

impl ResetSequencer {
    /// Creates a sequencer for the given window.
    ///
    /// The state starts deasserted, matching a `resetn` line driven high
    /// before the first tick. The first decision happens at the first low
    /// clock phase.
    pub fn new(window: ResetWindow) -> Self {
        Self {
            window,
            state: ResetState::Deasserted,
            last_update: None,
        }
    }

    /// Starts from the level `resetn` carries before the first tick.
    pub fn with_initial_level(mut self, resetn: bool) -> Self {
        self.state = if resetn {
            ResetState::Deasserted
        } else {
            ResetState::Asserted
        };
        self
    }

    /// Applies the reset decision for `time` if the clock is low.
    ///
    /// Returns the state now driven, or `None` if the clock is high and
    /// `resetn` was left untouched.
    pub fn apply(&mut self, time: SimTime, inputs: &mut DutInputs) -> Option<ResetState> {
        if !ClockToggler::is_low_phase(inputs) {
            return None;
        }

        let next = if self.window.contains(time) {
            ResetState::Asserted
        } else {
            ResetState::Deasserted
        };

        if self.last_update.is_none() || next != self.state {
            tracing::debug!(time, state = ?next, "reset transition");
        }

        inputs.resetn = next == ResetState::Deasserted;
        self.state = next;
        self.last_update = Some(time);
        Some(next)
    }

    /// Current decided state.
    pub fn state(&self) -> ResetState {
        self.state
    }

    /// The configured window.
    pub fn window(&self) -> ResetWindow {
        self.window
    }
}

impl Default for ResetSequencer {
    fn default() -> Self {
        Self::new(ResetWindow::default())
    }
}
