#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use coldtrace::{AntiCacheProfiler, PartitionId, ProcedureId, TransactionContext, TransactionId};

const TXNS: u64 = 50_000;

fn txn(id: u64) -> TransactionContext {
    TransactionContext {
        txn_id: TransactionId(id),
        proc_id: ProcedureId(1),
        restarts: 0,
    }
}

#[test]
fn concurrent_drain_loses_and_duplicates_nothing() {
    let profiler = Arc::new(AntiCacheProfiler::new(PartitionId(0)));
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let profiler = Arc::clone(&profiler);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for id in 0..TXNS {
                profiler.record_prepared_access(&txn(id));
            }
            done.store(true, Ordering::Release);
        })
    };

    let drainer = {
        let profiler = Arc::clone(&profiler);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                let finished = done.load(Ordering::Acquire);
                seen.extend(profiler.snapshot(true).prepared_accesses);
                if finished {
                    return seen;
                }
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    writer.join().unwrap();
    let seen = drainer.join().unwrap();

    assert_eq!(seen.len(), TXNS as usize);
    let mut ids: Vec<u64> = seen.iter().map(|r| r.txn_id.0).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), TXNS as usize);
}

#[test]
fn restart_counter_drains_each_increment_once() {
    let profiler = Arc::new(AntiCacheProfiler::new(PartitionId(0)));
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let profiler = Arc::clone(&profiler);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for _ in 0..TXNS {
                profiler.inc_restarted_txns();
            }
            done.store(true, Ordering::Release);
        })
    };

    let drainer = {
        let profiler = Arc::clone(&profiler);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut total = 0u64;
            loop {
                let finished = done.load(Ordering::Acquire);
                total += profiler.snapshot(true).restarted_txns;
                if finished {
                    return total;
                }
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    writer.join().unwrap();
    assert_eq!(drainer.join().unwrap(), TXNS);
    assert_eq!(profiler.restarted_txns(), 0);
}
