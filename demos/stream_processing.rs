// demos/stream_processing.rs
//! Demonstrates a pipeline of disposable, usage-limited worker handles

use slotpool::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

struct WorkerHandle {
    id: usize,
    closed: AtomicUsize,
}

impl Disposable for WorkerHandle {
    fn dispose(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.closed.store(1, Ordering::SeqCst);
        println!("  disposing worker handle {}", self.id);
        Ok(())
    }
}

fn main() -> Result<()> {
    println!("=== Disposable Worker Pool ===\n");

    // Each handle may be used five times before it retires and is disposed.
    let pool: Pool<WorkerHandle> = Pool::with_disposal(PoolConfig::single_use(3, 0));
    pool.set_max_usage_count(5).unwrap();

    for id in 0..3 {
        let r = pool.reserve(-1).unwrap();
        r.enable(WorkerHandle {
            id,
            closed: AtomicUsize::new(0),
        })
        .unwrap();
    }

    println!("Processing a stream of 20 work items...\n");
    for item in 0..20 {
        loop {
            if let Some(handle) = pool.acquire() {
                let worker_id = handle.pooled().unwrap().id;
                println!("item {item} processed by worker {worker_id}");
                if !pool.release(&handle) {
                    pool.remove(&handle);
                }
                break;
            }
        }
    }

    println!("\n=== Final Pool State ===\n");
    let stats = pool.stats();
    println!(
        "pending={} idle={} in_use={} size={}",
        stats.pending, stats.idle, stats.in_use, stats.size
    );
    println!(
        "Entries remaining have usage counts: {:?}",
        pool.values().iter().map(|e| e.usage_count()).collect::<Vec<_>>()
    );

    pool.close();
    println!("\nPool closed; size is now {}", pool.size());

    Ok(())
}
