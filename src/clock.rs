//! Simulation time and the clock input.

use crate::dut::DutInputs;
use crate::types::SimTime;

/// Owns the discrete time counter and the finish flag.
///
/// This is the only source of "current time" for the other stages. The
/// loop must check [`is_finished`](Self::is_finished) before each
/// iteration.
#[derive(Clone, Debug, Default)]
pub struct SimulationClock {
    time: SimTime,
    finished: bool,
}

impl SimulationClock {
    /// Creates a clock at time 0 with the finish flag clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances time by exactly one tick.
    pub fn advance(&mut self) {
        self.time += 1;
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> SimTime {
        self.time
    }

    /// Returns the finish flag as last observed from the DUT.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Latches the DUT's finish request. Once set, the flag stays set.
    pub fn observe_finish(&mut self, finished: bool) {
        self.finished |= finished;
    }
}

/// Inverts the clock input every tick.
///
/// Half-period is one tick, so the full period is two ticks. Later stages
/// read the clock value this leaves behind rather than tick parity.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockToggler;

impl ClockToggler {
    /// Flips `clk`.
    pub fn toggle(&self, inputs: &mut DutInputs) {
        inputs.clk = !inputs.clk;
    }

    /// True when the clock currently sits in its low phase (just after a
    /// falling edge).
    pub fn is_low_phase(inputs: &DutInputs) -> bool {
        !inputs.clk
    }
}
