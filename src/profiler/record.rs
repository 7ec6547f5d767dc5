//! Immutable history records kept by the per-partition profiler.

use std::cmp::Ordering;

use serde::Serialize;

use crate::types::{ProcedureId, TransactionId};

/// Summary of one completed eviction pass.
///
/// Ordering follows field declaration order: `(start_ms, stop_ms,
/// tuples_evicted, blocks_evicted, bytes_evicted)`, ascending. Two passes
/// with identical field tuples compare equal, so the second collapses into
/// the first when inserted into a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EvictionRecord {
    /// Wall-clock milliseconds when the pass started.
    pub start_ms: u64,
    /// Wall-clock milliseconds when the pass finished. Callers guarantee
    /// `stop_ms >= start_ms`; the profiler stores whatever it is given.
    pub stop_ms: u64,
    /// Tuples written out by the pass.
    pub tuples_evicted: u64,
    /// Blocks written out by the pass.
    pub blocks_evicted: u64,
    /// Bytes written out by the pass.
    pub bytes_evicted: u64,
}

impl EvictionRecord {
    /// Builds the summary of a pass that ran over `[start_ms, stop_ms]`.
    pub fn new(
        start_ms: u64,
        stop_ms: u64,
        tuples_evicted: u64,
        blocks_evicted: u64,
        bytes_evicted: u64,
    ) -> Self {
        Self {
            start_ms,
            stop_ms,
            tuples_evicted,
            blocks_evicted,
            bytes_evicted,
        }
    }

    /// Wall-clock span of the pass.
    pub fn duration_ms(&self) -> u64 {
        self.stop_ms.saturating_sub(self.start_ms)
    }
}

/// A transaction that discovered mid-execution that it touched evicted
/// tuples.
///
/// Ordering and equality use `(timestamp_ms, txn_id)` only. Transaction
/// ids are unique within the engine's operating horizon, so records for
/// distinct transactions never compare equal.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TupleAccessRecord {
    /// Wall-clock milliseconds when the access was recorded.
    pub timestamp_ms: u64,
    /// The transaction that hit evicted data.
    pub txn_id: TransactionId,
    /// Procedure the transaction was executing.
    pub proc_id: ProcedureId,
    /// How many times the transaction had already been restarted.
    pub restarts: u32,
    /// Evicted tuples the access touched.
    pub tuples_touched: u32,
    /// Evicted blocks the access touched.
    pub blocks_touched: u32,
    /// Tables involved in the access.
    pub tables_touched: u32,
}

impl TupleAccessRecord {
    /// Builds a record stamped with `timestamp_ms`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp_ms: u64,
        txn_id: TransactionId,
        proc_id: ProcedureId,
        restarts: u32,
        tuples_touched: u32,
        blocks_touched: u32,
        tables_touched: u32,
    ) -> Self {
        Self {
            timestamp_ms,
            txn_id,
            proc_id,
            restarts,
            tuples_touched,
            blocks_touched,
            tables_touched,
        }
    }

    fn sort_key(&self) -> (u64, TransactionId) {
        (self.timestamp_ms, self.txn_id)
    }
}

impl PartialEq for TupleAccessRecord {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for TupleAccessRecord {}

impl PartialOrd for TupleAccessRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TupleAccessRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A transaction blocked before execution because its working set was
/// known to require evicted data.
///
/// Ordering and equality use `(timestamp_ms, txn_id)`, as for
/// [`TupleAccessRecord`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PreparedAccessRecord {
    /// Wall-clock milliseconds when the transaction was blocked.
    pub timestamp_ms: u64,
    /// The blocked transaction.
    pub txn_id: TransactionId,
    /// Procedure the transaction would execute.
    pub proc_id: ProcedureId,
    /// How many times the transaction had already been restarted.
    pub restarts: u32,
}

impl PreparedAccessRecord {
    /// Builds a record stamped with `timestamp_ms`.
    pub fn new(timestamp_ms: u64, txn_id: TransactionId, proc_id: ProcedureId, restarts: u32) -> Self {
        Self {
            timestamp_ms,
            txn_id,
            proc_id,
            restarts,
        }
    }

    fn sort_key(&self) -> (u64, TransactionId) {
        (self.timestamp_ms, self.txn_id)
    }
}

impl PartialEq for PreparedAccessRecord {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for PreparedAccessRecord {}

impl PartialOrd for PreparedAccessRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreparedAccessRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
