//! Per-partition instrumentation for an anti-caching storage engine.
//!
//! Anti-caching evicts cold tuples from memory to secondary storage to
//! bound the working set. Transactions that touch evicted data are
//! aborted, the missing blocks are retrieved and merged back, and the
//! transaction restarts. Coldtrace is the bookkeeping layer that records
//! what the anti-cache subsystem did and what transactions experienced:
//! completed eviction passes, mid-execution evicted-tuple accesses,
//! pre-execution blocked accesses, restart pressure, and cumulative
//! elapsed time for the eviction / retrieval / merge operations.
//!
//! Each partition owns one [`AntiCacheProfiler`], touched only by that
//! partition's execution thread for writes; an external reporting layer
//! drains snapshots on its own cadence, per profiler or across all
//! partitions through a [`ProfilerRegistry`].

pub mod profiler;
pub mod registry;
pub mod types;

pub use profiler::{
    AntiCacheProfiler, EvictedTupleAccess, EvictionRecord, PreparedAccessRecord, ProfilerSnapshot,
    TimerScope, TimingAccumulator, TimingSnapshot, TransactionContext, TupleAccessRecord,
};
pub use registry::ProfilerRegistry;
pub use types::{BlockId, PartitionId, ProcedureId, ProfilerError, Result, TransactionId};
