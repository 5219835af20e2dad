//! # tickbench
//!
//! A cycle-stepped stimulus driver for clocked hardware models under
//! simulation.
//!
//! One global time counter advances by a single tick per iteration. Each
//! tick the driver toggles the clock, sequences reset on the clock's low
//! phase, applies a time-windowed stimulus schedule, evaluates the device
//! under test, watches for its completion flag and reports the resulting
//! signal snapshot. The run ends when the DUT raises its finish flag.
//!
//! ## Design Principles
//!
//! - **Fixed stage order**: reset never changes on the sampled edge, and
//!   stimulus rules apply in list order so overlapping windows layer.
//! - **Explicit context**: every [`Testbench`] owns its own clock and stages;
//!   nothing is global, so independent instances can run side by side.
//! - **Capability DUT**: the driver only sees [`DeviceUnderTest`], so any
//!   model (generated, behavioral, or scripted) can be plugged in.
//!
//! ## Features
//!
//! - `parallel` - Run independent testbenches on a rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use tickbench::{Testbench, TraceRecorder};
//! use tickbench::duts::CounterDut;
//!
//! let mut tb = Testbench::with_defaults(CounterDut::new());
//! let mut trace = TraceRecorder::new();
//! let summary = tb.run(&mut trace).unwrap();
//!
//! assert!(summary.finished);
//! assert_eq!(trace.at(35).unwrap().inputs.in_select, 0x2);
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use tickbench::config::TestbenchConfig;
//!
//! let config = TestbenchConfig::from_yaml_file("scenario.yaml")?;
//! let mut tb = Testbench::new(dut, &config);
//! ```

pub mod types;
pub mod dut;
pub mod clock;
pub mod reset;
pub mod schedule;
pub mod completion;
pub mod report;
pub mod engine;
pub mod config;
pub mod stats;
pub mod duts;
pub mod parallel;

// Re-export commonly used types
pub use types::{InputPort, SelectMode, SimTime};
pub use dut::{DeviceUnderTest, DutError, DutInputs, DutOutputs, SignalSnapshot};
pub use clock::{ClockToggler, SimulationClock};
pub use reset::{ResetSequencer, ResetState, ResetWindow};
pub use schedule::{Assignment, StimulusRule, StimulusSchedule, TimeWindow};
pub use completion::{CompletionConfig, CompletionDetector};
pub use report::{LineReporter, Reporter, TraceRecorder, TracingReporter, VcdReporter};
pub use engine::{LoopState, SimError, Testbench};
pub use config::{ConfigError, TestbenchConfig, TestbenchConfigBuilder};
pub use stats::{RunSummary, Timer};
pub use parallel::{run_all, ParallelRunner};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging. `RUST_LOG`
/// overrides `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// tickbench::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
