//! Elapsed-time accumulation for eviction, retrieval, and merge operations.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::types::{ProfilerError, Result};

/// Cumulative wall-clock timer for a named engine operation.
///
/// The surrounding engine brackets each operation with `start` / `stop`;
/// the accumulator tracks the total elapsed time and how many intervals
/// contributed to it within the current measurement epoch. One partition
/// thread drives all starts and stops, so a nested start or a stop without
/// a start is a collaborator defect and is reported as
/// [`ProfilerError::InvalidState`].
#[derive(Debug, Clone)]
pub struct TimingAccumulator {
    name: &'static str,
    total: Duration,
    invocations: u64,
    started_at: Option<Instant>,
}

impl TimingAccumulator {
    /// Creates an idle accumulator labelled `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            total: Duration::ZERO,
            invocations: 0,
            started_at: None,
        }
    }

    /// Label used in reports.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether an interval is currently open.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Total elapsed time across closed intervals this epoch.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of closed intervals this epoch.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Opens an interval at the current instant.
    pub fn start(&mut self) -> Result<()> {
        self.start_at(Instant::now())
    }

    /// Opens an interval at `at`.
    pub fn start_at(&mut self, at: Instant) -> Result<()> {
        if self.started_at.is_some() {
            return Err(ProfilerError::InvalidState(
                "start() on a timer that is already running",
            ));
        }
        self.started_at = Some(at);
        Ok(())
    }

    /// Closes the open interval at the current instant.
    pub fn stop(&mut self) -> Result<Duration> {
        self.stop_at(Instant::now())
    }

    /// Closes the open interval at `at`, folding the elapsed slice into
    /// the total and bumping the invocation count.
    pub fn stop_at(&mut self, at: Instant) -> Result<Duration> {
        let Some(started) = self.started_at.take() else {
            return Err(ProfilerError::InvalidState(
                "stop() on a timer that was never started",
            ));
        };
        let elapsed = at.saturating_duration_since(started);
        self.total += elapsed;
        self.invocations += 1;
        Ok(elapsed)
    }

    /// Zeroes the accumulated total and invocation count.
    ///
    /// An open interval keeps its start time and contributes at the next
    /// `stop()`.
    pub fn reset(&mut self) {
        self.total = Duration::ZERO;
        self.invocations = 0;
    }
}

/// RAII guard over a profiler-held accumulator slot.
///
/// Starts the slot's timer on construction; dropping the scope closes the
/// interval. Construction surfaces a double-start, drop discards the stop
/// result.
pub struct TimerScope<'a> {
    slot: &'a Mutex<TimingAccumulator>,
}

impl<'a> TimerScope<'a> {
    pub(crate) fn start(slot: &'a Mutex<TimingAccumulator>) -> Result<Self> {
        slot.lock().start()?;
        Ok(Self { slot })
    }
}

impl Drop for TimerScope<'_> {
    fn drop(&mut self) {
        let _ = self.slot.lock().stop();
    }
}
