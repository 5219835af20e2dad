//! Up/down counter model.
//!
//! A behavioral stand-in for the synchronous counter design the default
//! stimulus scenario was written against. State only changes on a rising
//! `clk` edge:
//!
//! - `resetn` low: count and status clear
//! - status high: counting has stopped; the value holds
//! - `in_start` high: count steps up (`in_select = 0x1`) or down
//!   (`in_select = 0x2`), other encodings hold; status is raised when
//!   the count reaches `in_data`
//! - otherwise: hold
//!
//! After status has been high for `settle_cycles` further rising edges,
//! the model requests the end of simulation.

use crate::dut::{DeviceUnderTest, DutError, DutInputs, DutOutputs};
use crate::types::SelectMode;

const DEFAULT_SETTLE_CYCLES: u32 = 2;

#[derive(Clone, Debug)]
pub struct CounterDut {
    count: u32,
    status: bool,
    prev_clk: bool,
    settle_cycles: u32,
    held_edges: u32,
    finished: bool,
    finalized: bool,
    rising_edges: u64,
}

impl Default for CounterDut {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterDut {
    pub fn new() -> Self {
        Self::with_settle_cycles(DEFAULT_SETTLE_CYCLES)
    }

    /// Sets how many rising edges follow completion before finishing.
    pub fn with_settle_cycles(settle_cycles: u32) -> Self {
        Self {
            count: 0,
            status: false,
            prev_clk: false,
            settle_cycles,
            held_edges: 0,
            finished: false,
            finalized: false,
            rising_edges: 0,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn rising_edges(&self) -> u64 {
        self.rising_edges
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn on_rising_edge(&mut self, inputs: &DutInputs) {
        self.rising_edges += 1;

        if inputs.in_reset() {
            self.count = 0;
            self.status = false;
            self.held_edges = 0;
            return;
        }

        if self.status {
            self.held_edges += 1;
            if self.held_edges >= self.settle_cycles && !self.finished {
                tracing::debug!(count = self.count, "counter settled; finishing");
                self.finished = true;
            }
        } else if inputs.in_start {
            self.count = match inputs.select_mode() {
                Some(SelectMode::ModeA) => self.count.wrapping_add(1),
                Some(SelectMode::ModeB) => self.count.wrapping_sub(1),
                _ => self.count,
            };
            self.status = self.count == inputs.in_data;
        }
    }
}

impl DeviceUnderTest for CounterDut {
    fn evaluate(&mut self, inputs: &DutInputs) -> Result<DutOutputs, DutError> {
        if inputs.clk && !self.prev_clk {
            self.on_rising_edge(inputs);
        }
        self.prev_clk = inputs.clk;

        Ok(DutOutputs {
            out_status: self.status,
            out_data: self.count,
        })
    }

    fn got_finish(&self) -> bool {
        self.finished
    }

    fn finalize(&mut self) {
        self.finalized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(dut: &mut CounterDut, inputs: DutInputs) -> DutOutputs {
        let low = DutInputs { clk: false, ..inputs };
        let high = DutInputs { clk: true, ..inputs };
        dut.evaluate(&low).unwrap();
        dut.evaluate(&high).unwrap()
    }

    fn counting(select: u8, data: u32) -> DutInputs {
        DutInputs {
            clk: false,
            resetn: true,
            in_start: true,
            in_select: select,
            in_data: data,
        }
    }

    #[test]
    fn test_counts_only_on_rising_edge() {
        let mut dut = CounterDut::new();
        let inputs = counting(0x1, 100);
        let high = DutInputs { clk: true, ..inputs };
        dut.evaluate(&high).unwrap();
        dut.evaluate(&high).unwrap();
        assert_eq!(dut.count(), 1);
        assert_eq!(dut.rising_edges(), 1);
    }

    #[test]
    fn test_up_and_down() {
        let mut dut = CounterDut::new();
        for _ in 0..3 {
            edge(&mut dut, counting(0x1, 100));
        }
        assert_eq!(dut.count(), 3);
        edge(&mut dut, counting(0x2, 100));
        assert_eq!(dut.count(), 2);
        edge(&mut dut, counting(0x0, 100));
        assert_eq!(dut.count(), 2);
    }

    #[test]
    fn test_reset_clears() {
        let mut dut = CounterDut::new();
        edge(&mut dut, counting(0x1, 100));
        let out = edge(
            &mut dut,
            DutInputs {
                resetn: false,
                ..counting(0x1, 100)
            },
        );
        assert_eq!(out.out_data, 0);
        assert!(!out.out_status);
    }

    #[test]
    fn test_status_and_finish() {
        let mut dut = CounterDut::with_settle_cycles(2);
        edge(&mut dut, counting(0x1, 2));
        let out = edge(&mut dut, counting(0x1, 2));
        assert!(out.out_status);
        assert!(!dut.got_finish());

        // Counting stops at the target even while start stays high.
        edge(&mut dut, counting(0x1, 2));
        assert_eq!(dut.count(), 2);
        assert!(!dut.got_finish());
        let out = edge(&mut dut, counting(0x1, 2));
        assert!(out.out_status);
        assert_eq!(out.out_data, 2);
        assert!(dut.got_finish());
    }

    #[test]
    fn test_wraps_below_zero() {
        let mut dut = CounterDut::new();
        edge(&mut dut, counting(0x2, 100));
        assert_eq!(dut.count(), u32::MAX);
    }
}
