//! Time-windowed stimulus schedule.
//!
//! A schedule is an ordered list of rules. Each rule owns a time window and
//! a list of port assignments. Every tick, every rule whose window contains
//! the current time is applied, in list order, so a later rule overrides an
//! earlier one when their windows overlap.
//!
//! # Default schedule
//!
//! | # | window     | assignments                     |
//! |---|------------|---------------------------------|
//! | 1 | `(10, 30]` | `in_select = 0x1`               |
//! | 2 | `(30, 40]` | `in_select = 0x2`               |
//! | 3 | `(40, ∞)`  | `in_select = 0x1`               |
//! | 4 | `(15, ∞)`  | `in_data = 0x25`, `in_start = 1` |

use serde::{Deserialize, Serialize};

use crate::dut::DutInputs;
use crate::types::{InputPort, SelectMode, SimTime};

/// Value the default schedule drives on `in_data`; the counter stops here.
pub const STOP_VALUE: u32 = 0x25;

/// Interval `(after, until]`, or `(after, ∞)` when `until` is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub after: SimTime,
    #[serde(default)]
    pub until: Option<SimTime>,
}

impl TimeWindow {
    /// Half-open window `(after, until]`.
    pub fn between(after: SimTime, until: SimTime) -> Self {
        Self {
            after,
            until: Some(until),
        }
    }

    /// Unbounded window `(after, ∞)`.
    pub fn after(after: SimTime) -> Self {
        Self { after, until: None }
    }

    /// True when `time` falls inside the window.
    pub fn contains(&self, time: SimTime) -> bool {
        time > self.after && self.until.map_or(true, |until| time <= until)
    }
}

/// A single port assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub port: InputPort,
    pub value: u64,
}

impl Assignment {
    pub fn new(port: InputPort, value: u64) -> Self {
        Self { port, value }
    }

    /// True if `value` fits the port width.
    pub fn fits(&self) -> bool {
        self.value <= self.port.max_value()
    }
}

/// One window with the assignments it applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusRule {
    #[serde(flatten)]
    pub window: TimeWindow,
    pub assign: Vec<Assignment>,
}

impl StimulusRule {
    /// Creates a rule with no assignments.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            assign: Vec::new(),
        }
    }

    /// Adds an assignment to this rule.
    pub fn with(mut self, port: InputPort, value: u64) -> Self {
        self.assign.push(Assignment::new(port, value));
        self
    }
}

/// Ordered stimulus rules, applied every tick regardless of clock phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StimulusSchedule {
    rules: Vec<StimulusRule>,
}

impl StimulusSchedule {
    /// Creates a schedule from rules in application order.
    pub fn new(rules: Vec<StimulusRule>) -> Self {
        Self { rules }
    }

    /// The four-rule counter scenario.
    pub fn counter_scenario() -> Self {
        Self::new(vec![
            StimulusRule::new(TimeWindow::between(10, 30))
                .with(InputPort::InSelect, SelectMode::ModeA.bits() as u64),
            StimulusRule::new(TimeWindow::between(30, 40))
                .with(InputPort::InSelect, SelectMode::ModeB.bits() as u64),
            StimulusRule::new(TimeWindow::after(40))
                .with(InputPort::InSelect, SelectMode::ModeA.bits() as u64),
            StimulusRule::new(TimeWindow::after(15))
                .with(InputPort::InData, STOP_VALUE as u64)
                .with(InputPort::InStart, 1),
        ])
    }

    /// Applies every rule whose window contains `time`, in order.
    ///
    /// Returns the number of rules that fired.
    pub fn apply(&self, time: SimTime, inputs: &mut DutInputs) -> usize {
        let mut fired = 0;
        for rule in &self.rules {
            if !rule.window.contains(time) {
                continue;
            }
            for assignment in &rule.assign {
                inputs.set(assignment.port, assignment.value);
            }
            fired += 1;
        }
        fired
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[StimulusRule] {
        &self.rules
    }

    /// Appends a rule after all existing ones.
    pub fn push(&mut self, rule: StimulusRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for StimulusSchedule {
    fn default() -> Self {
        Self::counter_scenario()
    }
}
