//! Integration tests for the default counter scenario.
//!
//! These tests drive full runs through the public API and check:
//! - Clock, reset and stimulus timing as seen by the reporter
//! - Completion handling with scripted and behavioral DUTs
//! - Termination, error and tick-limit paths

use tickbench::duts::{CounterDut, ScriptedDut};
use tickbench::{
    DeviceUnderTest, DutError, DutInputs, DutOutputs, LoopState, SimError, SignalSnapshot,
    Testbench, TraceRecorder,
};

// ============================================================================
// Helpers
// ============================================================================

fn trace_of<D: DeviceUnderTest>(dut: D) -> (Testbench<D>, TraceRecorder) {
    let mut tb = Testbench::with_defaults(dut);
    let mut trace = TraceRecorder::new();
    tb.run(&mut trace).unwrap();
    (tb, trace)
}

fn at(trace: &TraceRecorder, time: u64) -> SignalSnapshot {
    *trace.at(time).unwrap()
}

// ============================================================================
// Stimulus timing
// ============================================================================

#[test]
fn test_clock_alternates_from_first_tick() {
    let (_, trace) = trace_of(ScriptedDut::new().finish_after(60));

    for snap in trace.snapshots() {
        assert_eq!(snap.inputs.clk, snap.time % 2 == 1, "tick {}", snap.time);
    }
}

#[test]
fn test_reset_window() {
    let (_, trace) = trace_of(ScriptedDut::new().finish_after(30));

    assert!(at(&trace, 1).inputs.resetn);
    for t in 2..10 {
        assert!(!at(&trace, t).inputs.resetn, "reset released early at {}", t);
    }
    for t in 10..=30 {
        assert!(at(&trace, t).inputs.resetn, "reset asserted at {}", t);
    }
}

#[test]
fn test_reset_only_changes_on_low_phase() {
    let (_, trace) = trace_of(ScriptedDut::new().finish_after(30));
    let snaps = trace.snapshots();

    for pair in snaps.windows(2) {
        if pair[0].inputs.resetn != pair[1].inputs.resetn {
            assert!(!pair[1].inputs.clk, "reset changed on tick {}", pair[1].time);
        }
    }
}

#[test]
fn test_select_windows() {
    let (_, trace) = trace_of(ScriptedDut::new().finish_after(60));

    for t in 1..=10 {
        assert_eq!(at(&trace, t).inputs.in_select, 0x0, "tick {}", t);
    }
    for t in 11..=30 {
        assert_eq!(at(&trace, t).inputs.in_select, 0x1, "tick {}", t);
    }
    for t in 31..=40 {
        assert_eq!(at(&trace, t).inputs.in_select, 0x2, "tick {}", t);
    }
    for t in 41..=60 {
        assert_eq!(at(&trace, t).inputs.in_select, 0x1, "tick {}", t);
    }
}

#[test]
fn test_data_and_start_from_tick_16() {
    let (_, trace) = trace_of(ScriptedDut::new().finish_after(60));

    let before = at(&trace, 15);
    assert!(!before.inputs.in_start);
    assert_eq!(before.inputs.in_data, 0);

    for t in 16..=60 {
        let snap = at(&trace, t);
        assert!(snap.inputs.in_start, "tick {}", t);
        assert_eq!(snap.inputs.in_data, 0x25, "tick {}", t);
    }
}

#[test]
fn test_dut_sees_same_inputs_as_reporter_before_completion() {
    let (tb, trace) = trace_of(ScriptedDut::new().finish_after(40));
    let seen: Vec<DutInputs> = tb.dut().seen().to_vec();
    let reported: Vec<DutInputs> = trace.snapshots().iter().map(|s| s.inputs).collect();
    assert_eq!(seen, reported);
}

// ============================================================================
// Completion
// ============================================================================

#[test]
fn test_status_before_threshold_is_ignored() {
    let (tb, trace) = trace_of(ScriptedDut::new().status_from(20).finish_after(41));

    assert!(at(&trace, 40).inputs.in_start);
    assert!(!at(&trace, 41).inputs.in_start);
    assert_eq!(tb.completion_at(), Some(41));
}

#[test]
fn test_completion_withdraws_start_for_good() {
    let (tb, trace) = trace_of(ScriptedDut::new().status_from(45).finish_after(60));

    assert!(at(&trace, 44).inputs.in_start);
    for t in 45..=60 {
        assert!(!at(&trace, t).inputs.in_start, "start reasserted at {}", t);
    }
    // The DUT itself still evaluated tick 46 with the schedule's value.
    assert!(tb.dut().seen()[45].in_start);
    assert_eq!(tb.summary().completion_at, Some(45));
}

#[test]
fn test_counter_end_to_end() {
    let (tb, trace) = trace_of(CounterDut::new());
    let summary = tb.summary();

    assert_eq!(summary.final_time, 113);
    assert_eq!(summary.ticks_executed, 113);
    assert_eq!(summary.completion_at, Some(109));
    assert_eq!(summary.reset_released_at, Some(10));
    assert_eq!(summary.start_asserted_at, Some(16));
    assert!(summary.finished);
    assert!(tb.dut().is_finalized());

    assert_eq!(at(&trace, 29).outputs.out_data, 7);
    assert_eq!(at(&trace, 39).outputs.out_data, 2);
    assert_eq!(at(&trace, 41).outputs.out_data, 3);

    let done = at(&trace, 109);
    assert!(done.outputs.out_status);
    assert_eq!(done.outputs.out_data, 0x25);
    assert!(!done.inputs.in_start);
    assert!(!at(&trace, 108).outputs.out_status);
}

#[test]
fn test_runs_are_deterministic() {
    let (_, first) = trace_of(CounterDut::new());
    let (_, second) = trace_of(CounterDut::new());
    assert_eq!(first.snapshots(), second.snapshots());
}

// ============================================================================
// Termination
// ============================================================================

/// A DUT that finishes on its very first evaluation.
struct Immediate {
    finalized: u32,
}

impl DeviceUnderTest for Immediate {
    fn evaluate(&mut self, _inputs: &DutInputs) -> Result<DutOutputs, DutError> {
        Ok(DutOutputs::default())
    }

    fn got_finish(&self) -> bool {
        true
    }

    fn finalize(&mut self) {
        self.finalized += 1;
    }
}

#[test]
fn test_finish_on_first_tick() {
    let (tb, trace) = trace_of(Immediate { finalized: 0 });
    assert_eq!(trace.len(), 1);
    assert_eq!(tb.current_time(), 1);
    assert_eq!(tb.dut().finalized, 1);
}

#[test]
fn test_error_mid_run_reports_prior_ticks_only() {
    let mut tb = Testbench::with_defaults(ScriptedDut::new().fail_at(12));
    let mut trace = TraceRecorder::new();

    let err = tb.run(&mut trace).unwrap_err();
    assert_eq!(
        err,
        SimError::Dut(DutError::Evaluation {
            time: 12,
            message: "scripted failure".to_string(),
        })
    );
    assert_eq!(trace.len(), 11);
    assert_eq!(tb.state(), LoopState::Terminated);
    assert_eq!(tb.dut().finalize_calls(), 0);
}

#[test]
fn test_tick_limit_stops_runaway_dut() {
    let mut tb = Testbench::with_defaults(ScriptedDut::new()).with_max_ticks(200);
    let err = tb.run(()).unwrap_err();
    assert_eq!(err, SimError::TickLimitExceeded { limit: 200 });
    assert_eq!(tb.summary().ticks_executed, 200);
    assert!(!tb.is_finished());
    assert_eq!(tb.dut().finalize_calls(), 1);
    assert_eq!(tb.state(), LoopState::Terminated);
}

#[test]
fn test_manual_stepping_matches_run() {
    let mut stepped = Testbench::with_defaults(CounterDut::new());
    let mut snaps = Vec::new();
    while !stepped.is_finished() {
        snaps.push(stepped.step(&mut ()).unwrap());
    }

    let (_, trace) = trace_of(CounterDut::new());
    assert_eq!(snaps.as_slice(), trace.snapshots());

    assert!(stepped.dut().is_finalized());
    assert_eq!(stepped.state(), LoopState::Terminated);
    assert_eq!(stepped.summary().final_time, 113);
    assert_eq!(stepped.step(&mut ()), Err(SimError::AlreadyTerminated));
    assert_eq!(stepped.current_time(), 113);
}

#[test]
fn test_stepping_stops_at_finish() {
    let mut tb = Testbench::with_defaults(ScriptedDut::new().finish_after(3));
    for _ in 0..3 {
        tb.step(&mut ()).unwrap();
    }

    assert_eq!(tb.step(&mut ()), Err(SimError::AlreadyTerminated));
    assert_eq!(tb.dut().evaluations(), 3);
    assert_eq!(tb.dut().finalize_calls(), 1);
}
