//! Core type definitions for the testbench driver.
//!
//! This module defines the fundamental types shared by every stage of the
//! simulation loop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation time unit (one time-precision tick).
///
/// The counter starts at 0 and advances by exactly one tick per loop
/// iteration. Every scheduling decision compares against this value.
pub type SimTime = u64;

/// Operating mode carried on the 2-bit `in_select` port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    /// No sub-component selected
    Idle,
    /// Mode A (`0x1`): count up
    ModeA,
    /// Mode B (`0x2`): count down
    ModeB,
}

impl SelectMode {
    /// Returns the raw port encoding.
    pub fn bits(self) -> u8 {
        match self {
            SelectMode::Idle => 0x0,
            SelectMode::ModeA => 0x1,
            SelectMode::ModeB => 0x2,
        }
    }

    /// Decodes a raw `in_select` value. Unused encodings map to `None`.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0b11 {
            0x0 => Some(SelectMode::Idle),
            0x1 => Some(SelectMode::ModeA),
            0x2 => Some(SelectMode::ModeB),
            _ => None,
        }
    }
}

/// A driver-owned input port of the device under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPort {
    Clk,
    Resetn,
    InStart,
    InSelect,
    InData,
}

impl InputPort {
    /// Width of the port in bits.
    pub fn width(self) -> u32 {
        match self {
            InputPort::Clk | InputPort::Resetn | InputPort::InStart => 1,
            InputPort::InSelect => 2,
            InputPort::InData => 32,
        }
    }

    /// Largest value the port can carry.
    pub fn max_value(self) -> u64 {
        (1u64 << self.width()) - 1
    }

    /// Port name as it appears on the DUT.
    pub fn name(self) -> &'static str {
        match self {
            InputPort::Clk => "clk",
            InputPort::Resetn => "resetn",
            InputPort::InStart => "in_start",
            InputPort::InSelect => "in_select",
            InputPort::InData => "in_data",
        }
    }
}

impl fmt::Display for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
