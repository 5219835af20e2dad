//! Configuration system for the testbench.
//!
//! This module provides YAML/JSON configuration file support for describing
//! a stimulus scenario declaratively. Every section is optional; an empty
//! document yields the default counter scenario.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   max_ticks: 10000
//!   log_level: info
//!
//! initial:
//!   resetn: true
//!   clk: false
//!
//! reset:
//!   after: 1
//!   before: 10
//!
//! schedule:
//!   - after: 10
//!     until: 30
//!     assign:
//!       - { port: in_select, value: 1 }
//!   - after: 15
//!     assign:
//!       - { port: in_data, value: 37 }
//!       - { port: in_start, value: 1 }
//!
//! completion:
//!   after: 40
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::completion::CompletionConfig;
use crate::dut::DutInputs;
use crate::reset::ResetWindow;
use crate::schedule::{StimulusRule, StimulusSchedule};
use crate::types::SimTime;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global run parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Upper bound on ticks before the run is abandoned (unbounded if unset)
    #[serde(default)]
    pub max_ticks: Option<SimTime>,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            max_ticks: None,
            log_level: default_log_level(),
        }
    }
}

/// Complete testbench configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestbenchConfig {
    /// Global run parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Input values before the first tick
    #[serde(default)]
    pub initial: DutInputs,

    /// Reset assertion window
    #[serde(default)]
    pub reset: ResetWindow,

    /// Stimulus rules in application order
    #[serde(default)]
    pub schedule: StimulusSchedule,

    /// Completion detector settings
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl TestbenchConfig {
    /// Creates the default counter scenario configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: TestbenchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: TestbenchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.simulation.max_ticks == Some(0) {
            return Err(ConfigError::Validation(
                "max_ticks must be at least 1".to_string(),
            ));
        }

        if self.reset.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Reset window ({}, {}) contains no ticks",
                self.reset.after, self.reset.before
            )));
        }

        if self.initial.in_select > 0b11 {
            return Err(ConfigError::Validation(format!(
                "Initial in_select {:#x} does not fit 2 bits",
                self.initial.in_select
            )));
        }

        for (index, rule) in self.schedule.rules().iter().enumerate() {
            if let Some(until) = rule.window.until {
                if until <= rule.window.after {
                    return Err(ConfigError::Validation(format!(
                        "Rule {} window ({}, {}] is empty",
                        index, rule.window.after, until
                    )));
                }
            }
            if rule.assign.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Rule {} has no assignments",
                    index
                )));
            }
            for assignment in &rule.assign {
                if !assignment.fits() {
                    return Err(ConfigError::Validation(format!(
                        "Rule {} assigns {:#x} to {}, which is {} bit(s) wide",
                        index,
                        assignment.value,
                        assignment.port,
                        assignment.port.width()
                    )));
                }
            }
        }

        if self.schedule.is_empty() {
            tracing::warn!("Stimulus schedule is empty; only clock and reset will be driven");
        }

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the number of stimulus rules.
    pub fn rule_count(&self) -> usize {
        self.schedule.len()
    }
}

/// Builder for creating a `TestbenchConfig` programmatically.
///
/// Starts from the default scenario; call [`clear_schedule`](Self::clear_schedule)
/// to build a schedule from scratch.
#[derive(Default)]
pub struct TestbenchConfigBuilder {
    config: TestbenchConfig,
}

impl TestbenchConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the run to `ticks` ticks.
    pub fn max_ticks(mut self, ticks: SimTime) -> Self {
        self.config.simulation.max_ticks = Some(ticks);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Sets the initial input values.
    pub fn initial(mut self, inputs: DutInputs) -> Self {
        self.config.initial = inputs;
        self
    }

    /// Sets the reset window `(after, before)`.
    pub fn reset_window(mut self, after: SimTime, before: SimTime) -> Self {
        self.config.reset = ResetWindow { after, before };
        self
    }

    /// Removes every stimulus rule.
    pub fn clear_schedule(mut self) -> Self {
        self.config.schedule = StimulusSchedule::new(Vec::new());
        self
    }

    /// Appends a stimulus rule.
    pub fn add_rule(mut self, rule: StimulusRule) -> Self {
        self.config.schedule.push(rule);
        self
    }

    /// Sets the tick after which completion is honored.
    pub fn completion_after(mut self, after: SimTime) -> Self {
        self.config.completion = CompletionConfig { after };
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<TestbenchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
