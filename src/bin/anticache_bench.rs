//! Synthetic anti-cache workload driver for the per-partition profilers.
//!
//! Spawns one worker thread per partition, each simulating transactions
//! that occasionally hit evicted data, while a reporter thread drains the
//! profilers on an interval the way an external monitoring layer would.
#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use coldtrace::{
    BlockId, EvictedTupleAccess, EvictionRecord, PartitionId, ProcedureId, ProfilerRegistry,
    TimingSnapshot, TransactionContext, TransactionId,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "anticache-bench",
    version,
    about = "Drives a synthetic anti-cache workload against per-partition profilers"
)]
struct Args {
    /// Number of partitions (one worker thread each).
    #[arg(long, default_value_t = 4)]
    partitions: u32,

    /// Transactions simulated per partition.
    #[arg(long, default_value_t = 200_000)]
    txns: u64,

    /// Probability that a transaction hits evicted data mid-execution.
    #[arg(long, default_value_t = 0.05)]
    evicted_rate: f64,

    /// Probability that a transaction is blocked before execution.
    #[arg(long, default_value_t = 0.01)]
    prepared_rate: f64,

    /// Transactions between synthetic eviction passes.
    #[arg(long, default_value_t = 10_000)]
    eviction_every: u64,

    /// Reporter drain interval in milliseconds.
    #[arg(long, default_value_t = 250)]
    report_ms: u64,

    /// Base RNG seed; each partition derives its own stream from it.
    #[arg(long, default_value_t = 0xC01D)]
    seed: u64,

    /// Print the final summary as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// Per-partition totals accumulated across reporter drains.
#[derive(Debug, Default, Clone, Serialize)]
struct PartitionTotals {
    partition: u32,
    evictions: usize,
    evicted_accesses: usize,
    prepared_accesses: usize,
    restarted_txns: u64,
    eviction_time: TimingSnapshot,
    retrieval_time: TimingSnapshot,
    merge_time: TimingSnapshot,
}

impl PartitionTotals {
    fn absorb(&mut self, snapshot: &coldtrace::ProfilerSnapshot) {
        self.partition = snapshot.partition.0;
        self.evictions += snapshot.evictions.len();
        self.evicted_accesses += snapshot.evicted_accesses.len();
        self.prepared_accesses += snapshot.prepared_accesses.len();
        self.restarted_txns += snapshot.restarted_txns;
        // timers are cumulative and never reset by the drain
        self.eviction_time = snapshot.eviction_time;
        self.retrieval_time = snapshot.retrieval_time;
        self.merge_time = snapshot.merge_time;
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coldtrace=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn wall_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn format_ns(ns: u64) -> String {
    if ns < 1_000_000 {
        format!("{} µs", ns / 1_000)
    } else if ns < 1_000_000_000 {
        format!("{:.2} ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", ns as f64 / 1_000_000_000.0)
    }
}

fn run_partition(registry: &ProfilerRegistry, partition: u32, args: &Args) {
    let profiler = registry
        .get(PartitionId(partition))
        .expect("partition exists")
        .clone();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed ^ u64::from(partition));
    // partition-disjoint id space, as the engine's txn id allocator would hand out
    let mut next_txn = u64::from(partition) << 32;
    let mut pass_started = wall_ms();
    let mut tuples_since_pass = 0u64;

    for i in 0..args.txns {
        let txn = TransactionContext {
            txn_id: TransactionId(next_txn),
            proc_id: ProcedureId(rng.gen_range(0..32)),
            restarts: 0,
        };
        next_txn += 1;

        if rng.gen_bool(args.evicted_rate) {
            let block_ids: Vec<BlockId> = (0..rng.gen_range(1..=4))
                .map(|_| BlockId(rng.gen_range(0..4096)))
                .collect();
            let tuple_offsets: Vec<u32> = (0..rng.gen_range(1..=16))
                .map(|_| rng.gen_range(0..65_536))
                .collect();
            {
                let _retrieval = profiler.time_retrieval().expect("retrieval timer idle");
                let _merge = profiler.time_merge().expect("merge timer idle");
                // the real engine fetches and reinstalls the blocks here
            }
            profiler.record_evicted_access(
                &txn,
                &EvictedTupleAccess {
                    block_ids: &block_ids,
                    tuple_offsets: &tuple_offsets,
                    tables_touched: 1,
                },
            );
            profiler.inc_restarted_txns();
            tuples_since_pass += tuple_offsets.len() as u64;
        } else if rng.gen_bool(args.prepared_rate) {
            profiler.record_prepared_access(&txn);
            profiler.inc_restarted_txns();
        }

        if i > 0 && i % args.eviction_every == 0 {
            let _eviction = profiler.time_eviction().expect("eviction timer idle");
            let stop = wall_ms();
            let blocks = rng.gen_range(1..=8);
            profiler.record_eviction(EvictionRecord::new(
                pass_started,
                stop,
                tuples_since_pass,
                blocks,
                blocks * 4096,
            ));
            pass_started = stop;
            tuples_since_pass = 0;
        }
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let registry = Arc::new(ProfilerRegistry::new(args.partitions));
    let done = Arc::new(AtomicBool::new(false));

    let reporter = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        let interval = Duration::from_millis(args.report_ms);
        thread::spawn(move || {
            let mut totals: Vec<PartitionTotals> = vec![
                PartitionTotals::default();
                registry.partition_count()
            ];
            loop {
                let finished = done.load(Ordering::Acquire);
                for snapshot in registry.snapshot_all(true) {
                    snapshot.emit_tracing();
                    totals[snapshot.partition.0 as usize].absorb(&snapshot);
                }
                if finished {
                    return totals;
                }
                thread::sleep(interval);
            }
        })
    };

    let workers: Vec<_> = (0..args.partitions)
        .map(|partition| {
            let registry = Arc::clone(&registry);
            let args = args.clone();
            thread::spawn(move || run_partition(&registry, partition, &args))
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker thread panicked");
    }
    done.store(true, Ordering::Release);
    let totals = reporter.join().expect("reporter thread panicked");

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&totals).expect("totals serialize")
        );
        return;
    }

    println!("\nANTI-CACHE PROFILER TOTALS");
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12} {:>12}",
        "PARTITION", "EVICTIONS", "EVICTED", "PREPARED", "RESTARTS", "EVICT", "RETRIEVE", "MERGE"
    );
    for row in &totals {
        println!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12} {:>12}",
            row.partition,
            row.evictions,
            row.evicted_accesses,
            row.prepared_accesses,
            row.restarted_txns,
            format_ns(row.eviction_time.total_ns),
            format_ns(row.retrieval_time.total_ns),
            format_ns(row.merge_time.total_ns),
        );
    }
}
