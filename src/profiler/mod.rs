//! Per-partition anti-cache instrumentation.
//!
//! One [`AntiCacheProfiler`] exists per storage partition, owned by that
//! partition's execution context for the partition lifetime. Control flow
//! is push-only: the execution engine and the anti-cache manager call in
//! to append history records, bump the restart counter, or bracket their
//! eviction / retrieval / merge operations with the timing accumulators.
//! Nothing inside the profiler pulls data from elsewhere.
//!
//! All writes come from the partition's single execution thread; the only
//! cross-thread interaction is a reporting thread draining through
//! [`AntiCacheProfiler::snapshot`] or the per-history exports, which swap
//! state under short exclusive sections and never iterate under a lock.

mod clock;
mod history;
mod record;
mod snapshot;
mod timing;

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::types::{BlockId, PartitionId, ProcedureId, Result, TransactionId};
use clock::wall_millis;
use history::History;

pub use record::{EvictionRecord, PreparedAccessRecord, TupleAccessRecord};
pub use snapshot::{ProfilerSnapshot, TimingSnapshot};
pub use timing::{TimerScope, TimingAccumulator};

/// Transaction identity supplied by the execution engine when it reports
/// an evicted-data event.
#[derive(Debug, Clone, Copy)]
pub struct TransactionContext {
    /// The transaction's unique id.
    pub txn_id: TransactionId,
    /// Procedure the transaction executes.
    pub proc_id: ProcedureId,
    /// Times the engine has restarted this transaction so far.
    pub restarts: u32,
}

/// Mid-execution evicted-tuple access signal.
///
/// Carries the block ids and tuple offsets the transaction touched; the
/// profiler records only their counts.
#[derive(Debug, Clone, Copy)]
pub struct EvictedTupleAccess<'a> {
    /// Blocks that must be retrieved before re-execution.
    pub block_ids: &'a [BlockId],
    /// Offsets of the evicted tuples inside those blocks.
    pub tuple_offsets: &'a [u32],
    /// Tables involved in the access.
    pub tables_touched: u32,
}

/// Bookkeeping for one partition's anti-cache activity.
///
/// Recording methods are infallible and cheap: the partition's execution
/// thread calls them on the transaction hot path, and a failure here would
/// corrupt unrelated transactional work. No domain validation is
/// performed; nonsensical numeric inputs are stored as given.
pub struct AntiCacheProfiler {
    partition: PartitionId,
    evictions: History<EvictionRecord>,
    evicted_accesses: History<TupleAccessRecord>,
    prepared_accesses: History<PreparedAccessRecord>,
    restarted_txns: AtomicU64,
    eviction_time: Mutex<TimingAccumulator>,
    retrieval_time: Mutex<TimingAccumulator>,
    merge_time: Mutex<TimingAccumulator>,
}

impl AntiCacheProfiler {
    /// Creates the profiler owned by `partition` for its whole lifetime.
    pub fn new(partition: PartitionId) -> Self {
        Self {
            partition,
            evictions: History::new(),
            evicted_accesses: History::new(),
            prepared_accesses: History::new(),
            restarted_txns: AtomicU64::new(0),
            eviction_time: Mutex::new(TimingAccumulator::new("eviction")),
            retrieval_time: Mutex::new(TimingAccumulator::new("retrieval")),
            merge_time: Mutex::new(TimingAccumulator::new("merge")),
        }
    }

    /// Partition this profiler belongs to.
    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// Records a transaction that hit evicted tuples mid-execution.
    ///
    /// Stamps the record with the current coarse wall clock and inserts it
    /// into the evicted-access history. Side effect only; never fails.
    pub fn record_evicted_access(&self, txn: &TransactionContext, access: &EvictedTupleAccess<'_>) {
        let record = TupleAccessRecord::new(
            wall_millis(),
            txn.txn_id,
            txn.proc_id,
            txn.restarts,
            access.tuple_offsets.len() as u32,
            access.block_ids.len() as u32,
            access.tables_touched,
        );
        trace!(
            target: "coldtrace::profiler",
            txn = %txn.txn_id,
            blocks = access.block_ids.len(),
            tuples = access.tuple_offsets.len(),
            "evicted tuple access"
        );
        self.evicted_accesses.insert(record);
    }

    /// Records a transaction blocked before execution on evicted data.
    pub fn record_prepared_access(&self, txn: &TransactionContext) {
        let record =
            PreparedAccessRecord::new(wall_millis(), txn.txn_id, txn.proc_id, txn.restarts);
        trace!(
            target: "coldtrace::profiler",
            txn = %txn.txn_id,
            "prepared evicted access"
        );
        self.prepared_accesses.insert(record);
    }

    /// Records a completed eviction pass.
    ///
    /// `record.stop_ms >= record.start_ms` is the caller's responsibility;
    /// the history stores whatever it is given. A pass whose full field
    /// tuple equals an already-recorded one is silently dropped.
    pub fn record_eviction(&self, record: EvictionRecord) {
        debug!(
            target: "coldtrace::profiler",
            partition = self.partition.0,
            tuples = record.tuples_evicted,
            blocks = record.blocks_evicted,
            bytes = record.bytes_evicted,
            "eviction pass complete"
        );
        self.evictions.insert(record);
    }

    /// Counts one transaction restarted because it touched evicted data.
    ///
    /// Independent of history recording; code paths may call one, the
    /// other, or both.
    pub fn inc_restarted_txns(&self) {
        self.restarted_txns.fetch_add(1, Ordering::Relaxed);
    }

    /// Current restart count.
    pub fn restarted_txns(&self) -> u64 {
        self.restarted_txns.load(Ordering::Relaxed)
    }

    /// Clears the three histories and the restart counter.
    ///
    /// The timing accumulators are untouched; their callers reset them on
    /// their own reporting cadence.
    pub fn reset(&self) {
        self.evictions.clear();
        self.evicted_accesses.clear();
        self.prepared_accesses.clear();
        self.restarted_txns.store(0, Ordering::Relaxed);
    }

    /// Takes the eviction history, leaving it empty.
    pub fn export_evictions(&self) -> Vec<EvictionRecord> {
        self.evictions.export_and_clear()
    }

    /// Takes the evicted-access history, leaving it empty.
    pub fn export_evicted_accesses(&self) -> Vec<TupleAccessRecord> {
        self.evicted_accesses.export_and_clear()
    }

    /// Takes the prepared-access history, leaving it empty.
    pub fn export_prepared_accesses(&self) -> Vec<PreparedAccessRecord> {
        self.prepared_accesses.export_and_clear()
    }

    /// Captures everything the reporting layer reads.
    ///
    /// With `reset` the histories and restart counter are drained as they
    /// are read; the timing accumulators are copied but never reset here.
    pub fn snapshot(&self, reset: bool) -> ProfilerSnapshot {
        let (evictions, evicted_accesses, prepared_accesses, restarted_txns) = if reset {
            (
                self.evictions.export_and_clear(),
                self.evicted_accesses.export_and_clear(),
                self.prepared_accesses.export_and_clear(),
                self.restarted_txns.swap(0, Ordering::Relaxed),
            )
        } else {
            (
                self.evictions.snapshot(),
                self.evicted_accesses.snapshot(),
                self.prepared_accesses.snapshot(),
                self.restarted_txns.load(Ordering::Relaxed),
            )
        };
        ProfilerSnapshot {
            partition: self.partition,
            evictions,
            evicted_accesses,
            prepared_accesses,
            restarted_txns,
            eviction_time: TimingSnapshot::of(&self.eviction_time.lock()),
            retrieval_time: TimingSnapshot::of(&self.retrieval_time.lock()),
            merge_time: TimingSnapshot::of(&self.merge_time.lock()),
        }
    }

    /// Guarded access to the eviction timer.
    pub fn eviction_time(&self) -> MutexGuard<'_, TimingAccumulator> {
        self.eviction_time.lock()
    }

    /// Guarded access to the retrieval timer.
    pub fn retrieval_time(&self) -> MutexGuard<'_, TimingAccumulator> {
        self.retrieval_time.lock()
    }

    /// Guarded access to the merge timer.
    pub fn merge_time(&self) -> MutexGuard<'_, TimingAccumulator> {
        self.merge_time.lock()
    }

    /// Starts the eviction timer; the returned scope stops it on drop.
    pub fn time_eviction(&self) -> Result<TimerScope<'_>> {
        TimerScope::start(&self.eviction_time)
    }

    /// Starts the retrieval timer; the returned scope stops it on drop.
    pub fn time_retrieval(&self) -> Result<TimerScope<'_>> {
        TimerScope::start(&self.retrieval_time)
    }

    /// Starts the merge timer; the returned scope stops it on drop.
    pub fn time_merge(&self) -> Result<TimerScope<'_>> {
        TimerScope::start(&self.merge_time)
    }
}
