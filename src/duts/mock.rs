//! Scripted DUT for testing.
//!
//! `ScriptedDut` has no logic of its own. Its outputs, finish point and
//! failure point are fixed up front, and it records every input set it was
//! evaluated with, so driver stages can be checked in isolation.

use crate::dut::{DeviceUnderTest, DutError, DutInputs, DutOutputs};
use crate::types::SimTime;

/// A DUT whose behavior is a script indexed by evaluation count.
///
/// Evaluation `n` (1-based) corresponds to tick `n` when driven by a
/// [`Testbench`](crate::engine::Testbench).
#[derive(Clone, Debug, Default)]
pub struct ScriptedDut {
    /// `out_status` asserted from this evaluation on
    status_from: Option<SimTime>,
    /// `out_data` per evaluation, last value held
    data: Vec<u32>,
    /// Finish flag raised after this evaluation
    finish_after: Option<SimTime>,
    /// Evaluation that returns an error
    fail_at: Option<SimTime>,
    evaluations: SimTime,
    finished: bool,
    finalize_calls: u32,
    seen: Vec<DutInputs>,
}

impl ScriptedDut {
    /// A DUT that never completes, never finishes and never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asserts `out_status` from evaluation `n` onwards.
    pub fn status_from(mut self, n: SimTime) -> Self {
        self.status_from = Some(n);
        self
    }

    /// Drives `out_data` from a script; the last value is held.
    pub fn with_data(mut self, data: Vec<u32>) -> Self {
        self.data = data;
        self
    }

    /// Raises the finish flag after evaluation `n`.
    pub fn finish_after(mut self, n: SimTime) -> Self {
        self.finish_after = Some(n);
        self
    }

    /// Fails evaluation `n`.
    pub fn fail_at(mut self, n: SimTime) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// Every input set seen, in evaluation order.
    pub fn seen(&self) -> &[DutInputs] {
        &self.seen
    }

    /// Number of successful evaluations.
    pub fn evaluations(&self) -> SimTime {
        self.evaluations
    }

    /// Number of times `finalize` was called.
    pub fn finalize_calls(&self) -> u32 {
        self.finalize_calls
    }
}

impl DeviceUnderTest for ScriptedDut {
    fn evaluate(&mut self, inputs: &DutInputs) -> Result<DutOutputs, DutError> {
        let n = self.evaluations + 1;
        if self.fail_at == Some(n) {
            return Err(DutError::Evaluation {
                time: n,
                message: "scripted failure".to_string(),
            });
        }

        self.evaluations = n;
        self.seen.push(*inputs);

        if self.finish_after.is_some_and(|limit| n >= limit) {
            self.finished = true;
        }

        let index = (n as usize - 1).min(self.data.len().saturating_sub(1));
        Ok(DutOutputs {
            out_status: self.status_from.is_some_and(|from| n >= from),
            out_data: self.data.get(index).copied().unwrap_or(0),
        })
    }

    fn got_finish(&self) -> bool {
        self.finished
    }

    fn finalize(&mut self) {
        self.finalize_calls += 1;
    }
}
