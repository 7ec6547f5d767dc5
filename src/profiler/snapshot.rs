//! Point-in-time copies of profiler state for the reporting layer.

use serde::Serialize;
use tracing::info;

use super::record::{EvictionRecord, PreparedAccessRecord, TupleAccessRecord};
use super::timing::TimingAccumulator;
use crate::types::PartitionId;

/// Value copy of one accumulator's totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TimingSnapshot {
    /// Total nanoseconds across closed intervals.
    pub total_ns: u64,
    /// Number of closed intervals.
    pub invocations: u64,
}

impl TimingSnapshot {
    pub(crate) fn of(acc: &TimingAccumulator) -> Self {
        Self {
            total_ns: acc.total().as_nanos().min(u64::MAX as u128) as u64,
            invocations: acc.invocations(),
        }
    }

    /// Mean nanoseconds per closed interval; zero when nothing closed.
    pub fn mean_ns(&self) -> u64 {
        if self.invocations == 0 {
            0
        } else {
            self.total_ns / self.invocations
        }
    }
}

/// Everything the reporting layer reads from one partition's profiler.
///
/// The record vectors are ascending by each kind's sort key. No wire
/// format is imposed; the snapshot serializes with serde and the reporting
/// layer picks the encoding.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilerSnapshot {
    /// Partition the snapshot was taken from.
    pub partition: PartitionId,
    /// Completed eviction passes.
    pub evictions: Vec<EvictionRecord>,
    /// Mid-execution evicted-tuple accesses.
    pub evicted_accesses: Vec<TupleAccessRecord>,
    /// Pre-execution blocked accesses.
    pub prepared_accesses: Vec<PreparedAccessRecord>,
    /// Transactions restarted because they touched evicted data.
    pub restarted_txns: u64,
    /// Eviction timer totals.
    pub eviction_time: TimingSnapshot,
    /// Retrieval timer totals.
    pub retrieval_time: TimingSnapshot,
    /// Merge timer totals.
    pub merge_time: TimingSnapshot,
}

impl ProfilerSnapshot {
    /// Emits counts and timer totals to the tracing infrastructure.
    pub fn emit_tracing(&self) {
        info!(
            target: "coldtrace::profiler",
            partition = self.partition.0,
            evictions = self.evictions.len(),
            evicted_accesses = self.evicted_accesses.len(),
            prepared_accesses = self.prepared_accesses.len(),
            restarted_txns = self.restarted_txns,
            eviction_ns = self.eviction_time.total_ns,
            retrieval_ns = self.retrieval_time.total_ns,
            merge_ns = self.merge_time.total_ns,
            "anti-cache profiler snapshot"
        );
    }
}
