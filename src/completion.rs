//! Completion detection.
//!
//! Once the DUT reports `out_status` after the qualifying time, the start
//! stimulus is withdrawn so the design can settle. The detector latches:
//! from the first qualifying tick on, it deasserts `in_start` after every
//! evaluation, and it never asserts it.

use serde::{Deserialize, Serialize};

use crate::dut::{DutInputs, DutOutputs};
use crate::types::SimTime;

/// Settings for the completion detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Completion is only honored strictly after this tick
    #[serde(default = "default_after")]
    pub after: SimTime,
}

fn default_after() -> SimTime {
    40
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            after: default_after(),
        }
    }
}

/// Watches `out_status` and withdraws `in_start`.
#[derive(Clone, Debug, Default)]
pub struct CompletionDetector {
    config: CompletionConfig,
    fired_at: Option<SimTime>,
}

impl CompletionDetector {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            fired_at: None,
        }
    }

    /// Inspects outputs produced for `time` and deasserts `in_start` once
    /// completion has been observed.
    ///
    /// Must run after the DUT has been evaluated for `time`. Returns true
    /// if the start input is withdrawn on this tick.
    pub fn inspect(&mut self, time: SimTime, outputs: &DutOutputs, inputs: &mut DutInputs) -> bool {
        if self.fired_at.is_none() {
            if time <= self.config.after || !outputs.out_status {
                return false;
            }
            tracing::debug!(time, out_data = outputs.out_data, "completion observed");
            self.fired_at = Some(time);
        }

        inputs.in_start = false;
        true
    }

    /// True once completion has been observed.
    pub fn has_fired(&self) -> bool {
        self.fired_at.is_some()
    }

    /// First tick at which completion was observed.
    pub fn fired_at(&self) -> Option<SimTime> {
        self.fired_at
    }

    pub fn config(&self) -> CompletionConfig {
        self.config
    }
}
