//! Device-under-test interface and signal definitions.
//!
//! The DUT is an opaque synchronous circuit. The driver owns its inputs,
//! the DUT owns its outputs, and each tick the driver hands the current
//! inputs to [`DeviceUnderTest::evaluate`] and receives consistent outputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{InputPort, SelectMode, SimTime};

/// Errors a DUT may report while evaluating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DutError {
    #[error("evaluation failed at time {time}: {message}")]
    Evaluation { time: SimTime, message: String },
}

/// Input ports driven by the testbench.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutInputs {
    /// Clock (1-bit)
    pub clk: bool,
    /// Active-low reset (1-bit)
    pub resetn: bool,
    /// Start counting (1-bit)
    pub in_start: bool,
    /// Mode select (2-bit)
    pub in_select: u8,
    /// Data input (32-bit)
    pub in_data: u32,
}

impl Default for DutInputs {
    /// Reset released, clock low, no stimulus.
    fn default() -> Self {
        Self {
            clk: false,
            resetn: true,
            in_start: false,
            in_select: 0,
            in_data: 0,
        }
    }
}

impl DutInputs {
    /// Drives `port` with `value`, masked to the port width.
    pub fn set(&mut self, port: InputPort, value: u64) {
        let value = value & port.max_value();
        match port {
            InputPort::Clk => self.clk = value != 0,
            InputPort::Resetn => self.resetn = value != 0,
            InputPort::InStart => self.in_start = value != 0,
            InputPort::InSelect => self.in_select = value as u8,
            InputPort::InData => self.in_data = value as u32,
        }
    }

    /// Reads the current value of `port`.
    pub fn get(&self, port: InputPort) -> u64 {
        match port {
            InputPort::Clk => self.clk as u64,
            InputPort::Resetn => self.resetn as u64,
            InputPort::InStart => self.in_start as u64,
            InputPort::InSelect => self.in_select as u64,
            InputPort::InData => self.in_data as u64,
        }
    }

    /// Decoded `in_select`, if it carries a known mode.
    pub fn select_mode(&self) -> Option<SelectMode> {
        SelectMode::from_bits(self.in_select)
    }

    /// True while reset is asserted.
    pub fn in_reset(&self) -> bool {
        !self.resetn
    }
}

/// Output ports produced by the DUT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutOutputs {
    /// Completion flag (1-bit)
    pub out_status: bool,
    /// Result (32-bit)
    pub out_data: u32,
}

/// Every port value at one point in simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub time: SimTime,
    pub inputs: DutInputs,
    pub outputs: DutOutputs,
}

/// The capability the testbench drives.
///
/// Implementations are deterministic: the same input sequence from the
/// same initial state yields the same outputs.
pub trait DeviceUnderTest {
    /// Evaluates the model against the current inputs.
    ///
    /// Called exactly once per tick, after every input for that tick has
    /// been driven.
    fn evaluate(&mut self, inputs: &DutInputs) -> Result<DutOutputs, DutError>;

    /// True once the model has requested the end of simulation.
    fn got_finish(&self) -> bool {
        false
    }

    /// End-of-run hook, called exactly once after the loop terminates.
    fn finalize(&mut self) {}
}

impl<D: DeviceUnderTest + ?Sized> DeviceUnderTest for Box<D> {
    fn evaluate(&mut self, inputs: &DutInputs) -> Result<DutOutputs, DutError> {
        (**self).evaluate(inputs)
    }

    fn got_finish(&self) -> bool {
        (**self).got_finish()
    }

    fn finalize(&mut self) {
        (**self).finalize()
    }
}
