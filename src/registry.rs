//! Per-partition profiler ownership for the reporting layer.

use std::sync::Arc;

use crate::profiler::{AntiCacheProfiler, ProfilerSnapshot};
use crate::types::PartitionId;

/// Owns one [`AntiCacheProfiler`] per partition.
///
/// The execution side clones each partition's [`Arc`] into that
/// partition's context at startup; the reporting side walks the registry
/// on its own cadence with [`ProfilerRegistry::snapshot_all`].
pub struct ProfilerRegistry {
    partitions: Vec<Arc<AntiCacheProfiler>>,
}

impl ProfilerRegistry {
    /// Builds profilers for partitions `0..partition_count`.
    pub fn new(partition_count: u32) -> Self {
        let partitions = (0..partition_count)
            .map(|p| Arc::new(AntiCacheProfiler::new(PartitionId(p))))
            .collect();
        Self { partitions }
    }

    /// Number of partitions tracked.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Profiler for `partition`, if it exists.
    pub fn get(&self, partition: PartitionId) -> Option<&Arc<AntiCacheProfiler>> {
        self.partitions.get(partition.0 as usize)
    }

    /// Iterates the per-partition profilers in partition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AntiCacheProfiler>> {
        self.partitions.iter()
    }

    /// Snapshots every partition, optionally draining as it goes.
    pub fn snapshot_all(&self, reset: bool) -> Vec<ProfilerSnapshot> {
        self.partitions.iter().map(|p| p.snapshot(reset)).collect()
    }

    /// Emits one tracing snapshot line per partition.
    pub fn emit_tracing(&self) {
        for profiler in &self.partitions {
            profiler.snapshot(false).emit_tracing();
        }
    }
}
