//! Simple timing instrumentation for clustering runs.
//!
//! Enable with `--features timing` to collect per-phase totals.
//! When disabled, all timing operations compile to no-ops.

#[cfg(feature = "timing")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "timing")]
use std::time::Instant;

/// Global timing accumulators (in microseconds)
#[cfg(feature = "timing")]
pub static INIT_TIME_US: AtomicU64 = AtomicU64::new(0);
#[cfg(feature = "timing")]
pub static ASSIGN_TIME_US: AtomicU64 = AtomicU64::new(0);
#[cfg(feature = "timing")]
pub static UPDATE_TIME_US: AtomicU64 = AtomicU64::new(0);
#[cfg(feature = "timing")]
pub static SCORE_TIME_US: AtomicU64 = AtomicU64::new(0);

/// Call counts
#[cfg(feature = "timing")]
pub static RUNS: AtomicU64 = AtomicU64::new(0);
#[cfg(feature = "timing")]
pub static ITERATIONS: AtomicU64 = AtomicU64::new(0);
#[cfg(feature = "timing")]
pub static EMPTY_CLUSTER_EVENTS: AtomicU64 = AtomicU64::new(0);

/// Reset all timing accumulators.
#[cfg(feature = "timing")]
pub fn reset_timings() {
    INIT_TIME_US.store(0, Ordering::Relaxed);
    ASSIGN_TIME_US.store(0, Ordering::Relaxed);
    UPDATE_TIME_US.store(0, Ordering::Relaxed);
    SCORE_TIME_US.store(0, Ordering::Relaxed);
    RUNS.store(0, Ordering::Relaxed);
    ITERATIONS.store(0, Ordering::Relaxed);
    EMPTY_CLUSTER_EVENTS.store(0, Ordering::Relaxed);
}

/// Print timing summary.
#[cfg(feature = "timing")]
pub fn print_timings() {
    let init = INIT_TIME_US.load(Ordering::Relaxed);
    let assign = ASSIGN_TIME_US.load(Ordering::Relaxed);
    let update = UPDATE_TIME_US.load(Ordering::Relaxed);
    let score = SCORE_TIME_US.load(Ordering::Relaxed);
    let runs = RUNS.load(Ordering::Relaxed);
    let iterations = ITERATIONS.load(Ordering::Relaxed);
    let empty = EMPTY_CLUSTER_EVENTS.load(Ordering::Relaxed);

    println!("\n=== Timing Summary ===");
    println!("Init:           {:>8.2}ms ({} runs)", init as f64 / 1000.0, runs);
    println!(
        "Assignment:     {:>8.2}ms ({:.2}ms per iteration)",
        assign as f64 / 1000.0,
        if iterations > 0 {
            assign as f64 / iterations as f64 / 1000.0
        } else {
            0.0
        }
    );
    println!(
        "Update:         {:>8.2}ms ({} iterations, {} with empty clusters)",
        update as f64 / 1000.0,
        iterations,
        empty
    );
    println!("Score:          {:>8.2}ms", score as f64 / 1000.0);
    println!("======================\n");
}

/// RAII timer that adds elapsed time to an atomic counter.
#[cfg(feature = "timing")]
pub struct Timer {
    start: Instant,
    counter: &'static AtomicU64,
}

#[cfg(feature = "timing")]
impl Timer {
    #[inline]
    pub fn new(counter: &'static AtomicU64) -> Self {
        Self {
            start: Instant::now(),
            counter,
        }
    }
}

#[cfg(feature = "timing")]
impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_micros() as u64;
        self.counter.fetch_add(elapsed, Ordering::Relaxed);
    }
}

/// Increment a call counter.
#[cfg(feature = "timing")]
#[inline]
pub fn increment_calls(counter: &'static AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Macro for timing a code block. Compiles to no-op when timing feature is disabled.
#[macro_export]
macro_rules! timed {
    ($counter:expr, $block:expr) => {{
        #[cfg(feature = "timing")]
        {
            let _timer = $crate::cluster::timing::Timer::new($counter);
            $block
        }
        #[cfg(not(feature = "timing"))]
        {
            $block
        }
    }};
}

/// Macro for incrementing call count. Compiles to no-op when timing feature is disabled.
#[macro_export]
macro_rules! increment_counter {
    ($counter:expr) => {
        #[cfg(feature = "timing")]
        {
            $crate::cluster::timing::increment_calls($counter);
        }
    };
}

#[cfg(all(test, feature = "timing"))]
mod tests {
    use super::*;

    #[test]
    fn test_timer_accumulates() {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        {
            let _timer = Timer::new(&COUNTER);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(COUNTER.load(Ordering::Relaxed) >= 1000);
    }
}
