//! Running independent testbench instances side by side.
//!
//! Each [`Testbench`] owns its DUT, clock, reset sequencer, schedule and
//! completion detector, so instances share no mutable state and can run
//! on separate threads.
//!
//! # Feature Flag
//!
//! Multi-threaded execution requires the `parallel` feature:
//! ```toml
//! [dependencies]
//! tickbench = { version = "0.1", features = ["parallel"] }
//! ```
//! Without it, instances run one after another on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::dut::DeviceUnderTest;
use crate::engine::{SimError, Testbench};
use crate::report::Reporter;
use crate::stats::RunSummary;

/// Runs a batch of testbenches to completion.
///
/// # Example
///
/// ```ignore
/// use tickbench::parallel::ParallelRunner;
///
/// let results = ParallelRunner::new()
///     .with_threads(4)
///     .run(&mut benches, |_index| ());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParallelRunner {
    /// Number of worker threads (0 = auto)
    num_threads: usize,
}

impl ParallelRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads.
    ///
    /// Pass 0 for automatic detection (uses number of CPUs).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Returns the configured thread count (0 = auto).
    pub fn threads(&self) -> usize {
        self.num_threads
    }

    /// Runs every testbench, building each one's reporter from its index.
    ///
    /// Results are returned in input order.
    #[cfg(feature = "parallel")]
    pub fn run<D, R, F>(
        &self,
        benches: &mut [Testbench<D>],
        make_reporter: F,
    ) -> Vec<Result<RunSummary, SimError>>
    where
        D: DeviceUnderTest + Send,
        R: Reporter,
        F: Fn(usize) -> R + Sync,
    {
        let mut job = || -> Vec<Result<RunSummary, SimError>> {
            benches
                .par_iter_mut()
                .enumerate()
                .map(|(index, tb)| tb.run(make_reporter(index)))
                .collect()
        };

        if self.num_threads == 0 {
            return job();
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
        {
            Ok(pool) => pool.install(job),
            Err(err) => {
                tracing::warn!(error = %err, "could not build thread pool; using global pool");
                job()
            }
        }
    }

    /// Runs every testbench, building each one's reporter from its index.
    ///
    /// Results are returned in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn run<D, R, F>(
        &self,
        benches: &mut [Testbench<D>],
        make_reporter: F,
    ) -> Vec<Result<RunSummary, SimError>>
    where
        D: DeviceUnderTest + Send,
        R: Reporter,
        F: Fn(usize) -> R + Sync,
    {
        benches
            .iter_mut()
            .enumerate()
            .map(|(index, tb)| tb.run(make_reporter(index)))
            .collect()
    }
}

/// Runs every testbench with no reporter, using automatic threading.
pub fn run_all<D>(benches: &mut [Testbench<D>]) -> Vec<Result<RunSummary, SimError>>
where
    D: DeviceUnderTest + Send,
{
    ParallelRunner::new().run(benches, |_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestbenchConfigBuilder;
    use crate::duts::{CounterDut, ScriptedDut};

    #[test]
    fn test_runner_defaults() {
        assert_eq!(ParallelRunner::new().threads(), 0);
        assert_eq!(ParallelRunner::new().with_threads(4).threads(), 4);
    }

    #[test]
    fn test_run_all_independent_instances() {
        let mut benches: Vec<_> = (1..=4)
            .map(|i| Testbench::with_defaults(ScriptedDut::new().finish_after(10 * i)))
            .collect();

        let results = run_all(&mut benches);
        let finals: Vec<u64> = results
            .iter()
            .map(|r| r.as_ref().unwrap().final_time)
            .collect();
        assert_eq!(finals, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_errors_stay_per_instance() {
        let config = TestbenchConfigBuilder::new().max_ticks(500).build().unwrap();
        let duts: Vec<Box<dyn DeviceUnderTest + Send>> = vec![
            Box::new(CounterDut::new()),
            Box::new(ScriptedDut::new().fail_at(3)),
            Box::new(ScriptedDut::new()),
        ];
        let mut benches: Vec<_> = duts
            .into_iter()
            .map(|dut| Testbench::new(dut, &config))
            .collect();

        let results = ParallelRunner::new().with_threads(2).run(&mut benches, |_| ());
        assert!(results[0].as_ref().unwrap().finished);
        assert!(matches!(results[1], Err(SimError::Dut(_))));
        assert_eq!(results[2], Err(SimError::TickLimitExceeded { limit: 500 }));
    }
}
