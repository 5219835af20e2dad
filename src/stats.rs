//! Run statistics and export.
//!
//! A [`RunSummary`] records the milestones of one testbench run and can be
//! exported as JSON, CSV, or a human-readable summary.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::types::SimTime;

/// Milestones and counters of a single run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Simulation time when the loop stopped
    pub final_time: SimTime,

    /// Number of loop iterations executed
    pub ticks_executed: u64,

    /// Number of DUT evaluations
    pub evaluations: u64,

    /// Whether the DUT raised its finish flag
    pub finished: bool,

    /// First tick at which reset was released after having been asserted
    pub reset_released_at: Option<SimTime>,

    /// First tick at which `in_start` was driven high
    pub start_asserted_at: Option<SimTime>,

    /// First tick at which completion was observed
    pub completion_at: Option<SimTime>,

    /// Total wall-clock time in milliseconds
    pub wall_time_ms: f64,
}

impl RunSummary {
    /// Simulated ticks per wall-clock second.
    pub fn ticks_per_second(&self) -> f64 {
        if self.wall_time_ms > 0.0 {
            self.ticks_executed as f64 / (self.wall_time_ms / 1000.0)
        } else {
            0.0
        }
    }

    /// Exports the summary to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports the summary to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self.to_json().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })?;
        std::fs::write(path, json)
    }

    /// Exports the summary to a two-column CSV.
    pub fn to_csv(&self) -> String {
        fn opt(v: Option<SimTime>) -> String {
            v.map(|t| t.to_string()).unwrap_or_default()
        }

        let mut csv = String::new();
        csv.push_str("metric,value\n");
        csv.push_str(&format!("final_time,{}\n", self.final_time));
        csv.push_str(&format!("ticks_executed,{}\n", self.ticks_executed));
        csv.push_str(&format!("evaluations,{}\n", self.evaluations));
        csv.push_str(&format!("finished,{}\n", self.finished));
        csv.push_str(&format!("reset_released_at,{}\n", opt(self.reset_released_at)));
        csv.push_str(&format!("start_asserted_at,{}\n", opt(self.start_asserted_at)));
        csv.push_str(&format!("completion_at,{}\n", opt(self.completion_at)));
        csv.push_str(&format!("wall_time_ms,{:.2}\n", self.wall_time_ms));
        csv
    }

    /// Exports the summary to a CSV file.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_csv())
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        fn show(v: Option<SimTime>) -> String {
            v.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
        }

        writeln!(w, "=== Testbench Summary ===")?;
        writeln!(w, "Final time: {}", self.final_time)?;
        writeln!(w, "Ticks executed: {}", self.ticks_executed)?;
        writeln!(w, "DUT evaluations: {}", self.evaluations)?;
        writeln!(w, "Finished: {}", if self.finished { "yes" } else { "no" })?;
        writeln!(w, "Reset released at: {}", show(self.reset_released_at))?;
        writeln!(w, "Start asserted at: {}", show(self.start_asserted_at))?;
        writeln!(w, "Completion at: {}", show(self.completion_at))?;
        writeln!(w, "Wall time: {:.2} ms", self.wall_time_ms)?;
        Ok(())
    }

    /// Returns the human-readable summary as a string.
    pub fn summary(&self) -> std::io::Result<String> {
        let mut buf = Vec::new();
        self.write_summary(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunSummary {
        RunSummary {
            final_time: 113,
            ticks_executed: 113,
            evaluations: 113,
            finished: true,
            reset_released_at: Some(10),
            start_asserted_at: Some(16),
            completion_at: Some(109),
            wall_time_ms: 0.5,
        }
    }

    #[test]
    fn test_summary_json_export() {
        let json = sample().to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.completion_at, Some(109));
        assert!(parsed.finished);
    }

    #[test]
    fn test_summary_csv_export() {
        let mut summary = sample();
        summary.completion_at = None;
        let csv = summary.to_csv();
        assert!(csv.starts_with("metric,value\n"));
        assert!(csv.contains("final_time,113"));
        assert!(csv.contains("reset_released_at,10"));
        assert!(csv.contains("completion_at,\n"));
    }

    #[test]
    fn test_summary_output() {
        let text = sample().summary().unwrap();
        assert!(text.contains("Final time: 113"));
        assert!(text.contains("Completion at: 109"));
        assert!(text.contains("Finished: yes"));
    }

    #[test]
    fn test_ticks_per_second() {
        let summary = sample();
        assert!(summary.ticks_per_second() > 0.0);
        assert_eq!(RunSummary::default().ticks_per_second(), 0.0);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
    }

    #[test]
    fn test_file_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        sample().to_json_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"final_time\": 113"));
    }
}
