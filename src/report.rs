//! Per-tick reporting.
//!
//! The loop hands every [`SignalSnapshot`] to a [`Reporter`] once per tick,
//! in chronological order. Reporting is fire-and-forget: a reporter that
//! fails to write logs the failure once and drops further output instead
//! of stopping the simulation.

use std::io::{self, Write};

use crate::dut::SignalSnapshot;
use crate::types::SimTime;

/// Receives the full signal snapshot after each tick.
pub trait Reporter {
    fn report(&mut self, snapshot: &SignalSnapshot);
}

impl Reporter for () {
    fn report(&mut self, _snapshot: &SignalSnapshot) {}
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, snapshot: &SignalSnapshot) {
        (**self).report(snapshot)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, snapshot: &SignalSnapshot) {
        (**self).report(snapshot)
    }
}

/// Formats a snapshot as a single human-readable line.
pub fn format_line(s: &SignalSnapshot) -> String {
    format!(
        "[{}] clk={:x} rstn={:x} start={:x} select={:x} data_in={:08x} -> data_status={:x} data_out={:08x}",
        s.time,
        s.inputs.clk as u8,
        s.inputs.resetn as u8,
        s.inputs.in_start as u8,
        s.inputs.in_select,
        s.inputs.in_data,
        s.outputs.out_status as u8,
        s.outputs.out_data,
    )
}

/// Writes one line per tick to any `Write` sink.
pub struct LineReporter<W: Write> {
    out: W,
    failed: bool,
}

impl<W: Write> LineReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false }
    }

    /// True once a write has failed and output was suppressed.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl LineReporter<io::Stdout> {
    /// Reporter printing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter for LineReporter<W> {
    fn report(&mut self, snapshot: &SignalSnapshot) {
        if self.failed {
            return;
        }
        if let Err(err) = writeln!(self.out, "{}", format_line(snapshot)) {
            tracing::warn!(time = snapshot.time, error = %err, "line report failed; suppressing further output");
            self.failed = true;
        }
    }
}

/// Keeps every snapshot in memory.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    snapshots: Vec<SignalSnapshot>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded snapshots, oldest first.
    pub fn snapshots(&self) -> &[SignalSnapshot] {
        &self.snapshots
    }

    /// Snapshot recorded for `time`, if that tick ran.
    pub fn at(&self, time: SimTime) -> Option<&SignalSnapshot> {
        // Ticks start at 1 and are contiguous.
        let index = time.checked_sub(1)? as usize;
        self.snapshots.get(index).filter(|s| s.time == time)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Serializes the trace as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshots)
    }
}

impl Reporter for TraceRecorder {
    fn report(&mut self, snapshot: &SignalSnapshot) {
        self.snapshots.push(*snapshot);
    }
}

/// Emits each snapshot as a `trace`-level tracing event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, s: &SignalSnapshot) {
        tracing::trace!(
            time = s.time,
            clk = s.inputs.clk,
            resetn = s.inputs.resetn,
            in_start = s.inputs.in_start,
            in_select = s.inputs.in_select,
            in_data = s.inputs.in_data,
            out_status = s.outputs.out_status,
            out_data = s.outputs.out_data,
            "tick"
        );
    }
}

/// Identifier codes of the dumped wires.
struct VcdWires {
    clk: vcd::IdCode,
    resetn: vcd::IdCode,
    in_start: vcd::IdCode,
    in_select: vcd::IdCode,
    in_data: vcd::IdCode,
    out_status: vcd::IdCode,
    out_data: vcd::IdCode,
}

/// Dumps the port values as a VCD waveform.
///
/// Only changed values are written after the first tick.
pub struct VcdReporter<W: Write> {
    writer: vcd::Writer<W>,
    wires: VcdWires,
    last: Option<SignalSnapshot>,
    failed: bool,
}

impl<W: Write> VcdReporter<W> {
    /// Writes the VCD header declaring every port under `module`.
    pub fn new(out: W, module: &str) -> io::Result<Self> {
        let mut writer = vcd::Writer::new(out);
        writer.timescale(1, vcd::TimescaleUnit::PS)?;
        writer.add_module(module)?;
        let wires = VcdWires {
            clk: writer.add_wire(1, "clk")?,
            resetn: writer.add_wire(1, "resetn")?,
            in_start: writer.add_wire(1, "in_start")?,
            in_select: writer.add_wire(2, "in_select")?,
            in_data: writer.add_wire(32, "in_data")?,
            out_status: writer.add_wire(1, "out_status")?,
            out_data: writer.add_wire(32, "out_data")?,
        };
        writer.upscope()?;
        writer.enddefinitions()?;

        Ok(Self {
            writer,
            wires,
            last: None,
            failed: false,
        })
    }

    /// True once a write has failed and dumping stopped.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    fn write_snapshot(&mut self, s: &SignalSnapshot) -> io::Result<()> {
        let first = self.last.is_none();
        let p = self.last.unwrap_or(*s);

        self.writer.timestamp(s.time)?;
        if first || p.inputs.clk != s.inputs.clk {
            self.writer.change_scalar(self.wires.clk, s.inputs.clk)?;
        }
        if first || p.inputs.resetn != s.inputs.resetn {
            self.writer.change_scalar(self.wires.resetn, s.inputs.resetn)?;
        }
        if first || p.inputs.in_start != s.inputs.in_start {
            self.writer.change_scalar(self.wires.in_start, s.inputs.in_start)?;
        }
        if first || p.inputs.in_select != s.inputs.in_select {
            self.writer
                .change_vector(self.wires.in_select, &bits(s.inputs.in_select as u64, 2))?;
        }
        if first || p.inputs.in_data != s.inputs.in_data {
            self.writer
                .change_vector(self.wires.in_data, &bits(s.inputs.in_data as u64, 32))?;
        }
        if first || p.outputs.out_status != s.outputs.out_status {
            self.writer
                .change_scalar(self.wires.out_status, s.outputs.out_status)?;
        }
        if first || p.outputs.out_data != s.outputs.out_data {
            self.writer
                .change_vector(self.wires.out_data, &bits(s.outputs.out_data as u64, 32))?;
        }
        self.last = Some(*s);
        Ok(())
    }
}

/// MSB-first bit values of `value`.
fn bits(value: u64, width: u32) -> Vec<vcd::Value> {
    (0..width)
        .rev()
        .map(|i| ((value >> i) & 1 == 1).into())
        .collect()
}

impl<W: Write> Reporter for VcdReporter<W> {
    fn report(&mut self, snapshot: &SignalSnapshot) {
        if self.failed {
            return;
        }
        if let Err(err) = self.write_snapshot(snapshot) {
            tracing::warn!(time = snapshot.time, error = %err, "VCD dump failed; suppressing further output");
            self.failed = true;
        }
    }
}
