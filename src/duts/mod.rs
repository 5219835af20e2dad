//! Built-in DUT models.
//!
//! # Available Models
//!
//! - [`CounterDut`] - Behavioral model of the up/down counter the default
//!   scenario targets
//! - [`ScriptedDut`] - Stub with scripted outputs, finish and failure points

pub mod counter;
pub mod mock;

pub use counter::CounterDut;
pub use mock::ScriptedDut;
