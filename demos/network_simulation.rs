// demos/network_simulation.rs
//! Simulates a pool of network connections shared by worker threads

use slotpool::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

struct Connection {
    id: u64,
    requests_served: AtomicU64,
}

fn main() -> Result<()> {
    println!("=== Network Connection Pool Simulation ===\n");

    // Eight real connections, each multiplexable by up to four callers at
    // once, and a per-thread cache so most requests never touch the shared
    // list.
    let pool: Pool<Connection> = Pool::new(PoolConfig::multiplexed(8, 8, 4));
    for id in 0..8 {
        let r = pool.reserve(-1).unwrap();
        r.enable(Connection {
            id,
            requests_served: AtomicU64::new(0),
        })
        .unwrap();
    }

    println!("Pool populated with {} connections\n", pool.size());

    let num_workers = 16;
    let requests_per_worker = 5_000;
    let pool = Arc::new(pool);
    let start = Instant::now();

    let handles: Vec<_> = (0..num_workers)
        .map(|worker_id| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let mut served = 0;
                for _ in 0..requests_per_worker {
                    loop {
                        if let Some(conn) = pool.acquire() {
                            let c = conn.pooled().unwrap();
                            c.requests_served.fetch_add(1, Ordering::Relaxed);
                            pool.release(&conn);
                            served += 1;
                            break;
                        }
                    }
                }
                (worker_id, served)
            })
        })
        .collect();

    for h in handles {
        let (worker_id, served) = h.join().unwrap();
        if worker_id % 4 == 0 {
            println!("Worker {worker_id} served {served} requests");
        }
    }

    let elapsed = start.elapsed();
    let total = num_workers * requests_per_worker;
    println!("\nServed {total} requests across {num_workers} workers in {elapsed:?}");
    println!(
        "Average: {:.2} µs per request",
        elapsed.as_micros() as f64 / total as f64
    );

    println!("\n=== Pool Statistics ===\n");
    let stats = pool.stats();
    println!(
        "pending={} idle={} in_use={} size={}",
        stats.pending, stats.idle, stats.in_use, stats.size
    );

    let per_connection: Vec<u64> = pool
        .values()
        .iter()
        .map(|e| e.pooled().unwrap().requests_served.load(Ordering::Relaxed))
        .collect();
    println!("Requests per connection: {per_connection:?}");

    Ok(())
}
