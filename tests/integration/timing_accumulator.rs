#![allow(missing_docs)]

use std::time::{Duration, Instant};

use coldtrace::{AntiCacheProfiler, PartitionId, ProfilerError, TimingAccumulator};

#[test]
fn simulated_delay_accumulates_exactly() {
    let mut acc = TimingAccumulator::new("eviction");
    let t0 = Instant::now();
    acc.start_at(t0).unwrap();
    let elapsed = acc.stop_at(t0 + Duration::from_millis(125)).unwrap();
    assert_eq!(elapsed, Duration::from_millis(125));
    assert_eq!(acc.total(), Duration::from_millis(125));
    assert_eq!(acc.invocations(), 1);
}

#[test]
fn stop_without_start_is_invalid_state() {
    let mut acc = TimingAccumulator::new("retrieval");
    assert!(matches!(acc.stop(), Err(ProfilerError::InvalidState(_))));
    assert_eq!(acc.invocations(), 0);
}

#[test]
fn second_start_without_stop_is_invalid_state() {
    let mut acc = TimingAccumulator::new("merge");
    acc.start().unwrap();
    assert!(matches!(acc.start(), Err(ProfilerError::InvalidState(_))));
    // the original interval is still open and can be closed normally
    assert!(acc.stop().is_ok());
    assert_eq!(acc.invocations(), 1);
}

#[test]
fn reset_zeroes_totals_and_keeps_open_interval() {
    let mut acc = TimingAccumulator::new("eviction");
    let t0 = Instant::now();
    acc.start_at(t0).unwrap();
    acc.start_at(t0).unwrap_err();
    acc.reset();
    assert!(acc.is_running());
    assert_eq!(acc.total(), Duration::ZERO);
    assert_eq!(acc.invocations(), 0);

    let elapsed = acc.stop_at(t0 + Duration::from_millis(40)).unwrap();
    assert_eq!(elapsed, Duration::from_millis(40));
    assert_eq!(acc.total(), Duration::from_millis(40));
    assert_eq!(acc.invocations(), 1);
}

#[test]
fn profiler_owns_three_named_timers() {
    let profiler = AntiCacheProfiler::new(PartitionId(2));
    assert_eq!(profiler.eviction_time().name(), "eviction");
    assert_eq!(profiler.retrieval_time().name(), "retrieval");
    assert_eq!(profiler.merge_time().name(), "merge");
}

#[test]
fn timer_scope_stops_on_drop() {
    let profiler = AntiCacheProfiler::new(PartitionId(0));
    {
        let _scope = profiler.time_eviction().unwrap();
        assert!(profiler.eviction_time().is_running());
        // nested start through a second scope is rejected
        assert!(profiler.time_eviction().is_err());
    }
    let timer = profiler.eviction_time();
    assert!(!timer.is_running());
    assert_eq!(timer.invocations(), 1);
}

#[test]
fn timer_scopes_are_independent_per_operation() {
    let profiler = AntiCacheProfiler::new(PartitionId(0));
    let retrieval = profiler.time_retrieval().unwrap();
    let merge = profiler.time_merge().unwrap();
    drop(merge);
    drop(retrieval);
    assert_eq!(profiler.retrieval_time().invocations(), 1);
    assert_eq!(profiler.merge_time().invocations(), 1);
    assert_eq!(profiler.eviction_time().invocations(), 0);
}
