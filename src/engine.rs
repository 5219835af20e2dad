//! The simulation loop.
//!
//! A [`Testbench`] owns one DUT together with its clock, reset sequencer,
//! stimulus schedule and completion detector. Each iteration runs the
//! stages in a fixed order:
//!
//! 1. advance the clock by one tick
//! 2. toggle `clk`
//! 3. on the low phase, update reset
//! 4. apply the stimulus schedule
//! 5. evaluate the DUT
//! 6. let the completion detector inspect the outputs
//! 7. hand the snapshot to the reporter
//! 8. latch the DUT's finish flag
//!
//! The loop stops when the finish flag is seen, after which the DUT's
//! `finalize` hook runs exactly once. This holds whether the testbench is
//! driven by [`Testbench::run`] or tick by tick through [`Testbench::step`].

use thiserror::Error;

use crate::clock::{ClockToggler, SimulationClock};
use crate::completion::CompletionDetector;
use crate::config::TestbenchConfig;
use crate::dut::{DeviceUnderTest, DutError, DutInputs, DutOutputs, SignalSnapshot};
use crate::report::Reporter;
use crate::reset::{ResetSequencer, ResetState};
use crate::schedule::StimulusSchedule;
use crate::stats::{RunSummary, Timer};
use crate::types::SimTime;

/// Errors that stop a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Dut(#[from] DutError),

    #[error("tick limit of {limit} reached before the DUT finished")]
    TickLimitExceeded { limit: SimTime },

    #[error("testbench has already terminated")]
    AlreadyTerminated,
}

/// Lifecycle of the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// A single DUT and the stages that drive it.
pub struct Testbench<D: DeviceUnderTest> {
    dut: D,
    clock: SimulationClock,
    toggler: ClockToggler,
    reset: ResetSequencer,
    schedule: StimulusSchedule,
    completion: CompletionDetector,
    inputs: DutInputs,
    outputs: DutOutputs,
    max_ticks: Option<SimTime>,
    state: LoopState,
    summary: RunSummary,
    reset_seen: bool,
}

impl<D: DeviceUnderTest> Testbench<D> {
    /// Creates a testbench driving `dut` with the given configuration.
    ///
    /// The configuration is assumed to be validated.
    pub fn new(dut: D, config: &TestbenchConfig) -> Self {
        Self {
            dut,
            clock: SimulationClock::new(),
            toggler: ClockToggler,
            reset: ResetSequencer::new(config.reset).with_initial_level(config.initial.resetn),
            schedule: config.schedule.clone(),
            completion: CompletionDetector::new(config.completion),
            inputs: config.initial,
            outputs: DutOutputs::default(),
            max_ticks: config.simulation.max_ticks,
            state: LoopState::Running,
            summary: RunSummary::default(),
            reset_seen: !config.initial.resetn,
        }
    }

    /// Creates a testbench running the default counter scenario.
    pub fn with_defaults(dut: D) -> Self {
        Self::new(dut, &TestbenchConfig::default())
    }

    /// Bounds the run to `limit` ticks.
    pub fn with_max_ticks(mut self, limit: SimTime) -> Self {
        self.max_ticks = Some(limit);
        self
    }

    /// Executes one iteration of the loop.
    ///
    /// Returns the snapshot handed to the reporter. When the DUT raises its
    /// finish flag during this tick, the testbench terminates and finalizes
    /// the DUT; further calls fail with [`SimError::AlreadyTerminated`]. A
    /// DUT evaluation error terminates the testbench without calling
    /// `finalize`.
    pub fn step<R: Reporter>(&mut self, reporter: &mut R) -> Result<SignalSnapshot, SimError> {
        if self.state == LoopState::Terminated {
            return Err(SimError::AlreadyTerminated);
        }

        self.clock.advance();
        let time = self.clock.current_time();

        self.toggler.toggle(&mut self.inputs);

        if let Some(state) = self.reset.apply(time, &mut self.inputs) {
            match state {
                ResetState::Asserted => self.reset_seen = true,
                ResetState::Deasserted => {
                    if self.reset_seen && self.summary.reset_released_at.is_none() {
                        self.summary.reset_released_at = Some(time);
                    }
                }
            }
        }

        self.schedule.apply(time, &mut self.inputs);
        if self.inputs.in_start && self.summary.start_asserted_at.is_none() {
            tracing::debug!(time, "start asserted");
            self.summary.start_asserted_at = Some(time);
        }

        self.outputs = match self.dut.evaluate(&self.inputs) {
            Ok(outputs) => outputs,
            Err(err) => {
                tracing::error!(time, error = %err, "DUT evaluation failed");
                self.state = LoopState::Terminated;
                return Err(err.into());
            }
        };
        self.summary.evaluations += 1;

        self.completion.inspect(time, &self.outputs, &mut self.inputs);

        let snapshot = self.snapshot();
        reporter.report(&snapshot);

        self.clock.observe_finish(self.dut.got_finish());
        self.summary.ticks_executed += 1;
        if self.clock.is_finished() {
            self.terminate();
        }
        Ok(snapshot)
    }

    /// Runs until the DUT raises its finish flag.
    ///
    /// On normal termination the DUT is finalized and the run summary is
    /// returned. Reaching the tick limit also finalizes the DUT before the
    /// error is returned. Calling `run` again afterwards fails with
    /// [`SimError::AlreadyTerminated`].
    pub fn run<R: Reporter>(&mut self, mut reporter: R) -> Result<RunSummary, SimError> {
        if self.state == LoopState::Terminated {
            return Err(SimError::AlreadyTerminated);
        }

        tracing::info!(
            start_time = self.clock.current_time(),
            max_ticks = ?self.max_ticks,
            rules = self.schedule.len(),
            "simulation started"
        );
        let timer = Timer::start();

        while self.state == LoopState::Running {
            if let Some(limit) = self.max_ticks {
                if self.summary.ticks_executed >= limit {
                    tracing::warn!(limit, time = self.clock.current_time(), "tick limit reached");
                    self.terminate();
                    self.summary.wall_time_ms = timer.elapsed_ms();
                    return Err(SimError::TickLimitExceeded { limit });
                }
            }
            self.step(&mut reporter)?;
        }

        self.summary.wall_time_ms = timer.elapsed_ms();

        tracing::info!(
            final_time = self.summary.final_time,
            completion_at = ?self.summary.completion_at,
            "simulation finished"
        );
        Ok(self.summary.clone())
    }

    /// Transitions to terminated and finalizes the DUT once.
    fn terminate(&mut self) {
        if self.state == LoopState::Terminated {
            return;
        }
        tracing::debug!(time = self.clock.current_time(), "testbench terminated");
        self.dut.finalize();
        self.state = LoopState::Terminated;
        self.summary.final_time = self.clock.current_time();
        self.summary.finished = self.clock.is_finished();
        self.summary.completion_at = self.completion.fired_at();
    }

    /// Current signal values.
    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            time: self.clock.current_time(),
            inputs: self.inputs,
            outputs: self.outputs,
        }
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> SimTime {
        self.clock.current_time()
    }

    /// Returns true once the DUT's finish flag has been observed.
    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn inputs(&self) -> &DutInputs {
        &self.inputs
    }

    pub fn outputs(&self) -> &DutOutputs {
        &self.outputs
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }

    /// Consumes the testbench and returns the DUT.
    pub fn into_dut(self) -> D {
        self.dut
    }

    /// First tick at which completion was observed.
    pub fn completion_at(&self) -> Option<SimTime> {
        self.completion.fired_at()
    }

    /// Reset state as last decided by the sequencer.
    pub fn reset_state(&self) -> ResetState {
        self.reset.state()
    }

    /// Milestones recorded so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}
