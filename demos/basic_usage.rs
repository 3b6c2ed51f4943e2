// demos/basic_usage.rs
//! Basic usage example of the pool module

use slotpool::prelude::*;

fn main() -> Result<()> {
    println!("=== Basic Pool Usage ===\n");

    // 1. Reserve a slot, then publish a value into it.
    let pool: Pool<String> = Pool::new(PoolConfig::new(4, 2));
    let reservation = pool.reserve(-1).expect("under capacity");
    reservation.enable(String::from("connection #1"))?;

    println!("Pool size after one reservation: {}", pool.size());

    // 2. Acquire it back out and release it when done.
    let entry = pool.acquire().expect("one idle entry");
    println!("Acquired: {:?}", entry.pooled());
    pool.release(&entry);

    println!("\n=== RAII Guard ===\n");

    // 3. `acquire_guarded` hands back a guard that releases on drop.
    {
        let guarded = pool.acquire_guarded().expect("entry is idle");
        println!("Guarded value: {}", guarded.as_str());
    }
    println!("Guard dropped, entry released automatically");

    println!("\n=== Multiplexing ===\n");

    // 4. Raise the concurrent-acquisition cap so several holders can share
    // one entry at once.
    let shared: Pool<&str> = Pool::new(PoolConfig::multiplexed(1, 0, 3));
    let r = shared.reserve(-1).unwrap();
    r.enable("shared connection").unwrap();

    let a = shared.acquire().unwrap();
    let b = shared.acquire().unwrap();
    println!(
        "Two concurrent holders of the same entry, usage_count={}",
        a.usage_count()
    );
    shared.release(&a);
    shared.release(&b);

    println!("\n=== Usage-Count Retirement ===\n");

    // 5. Entries retire after a fixed number of acquisitions.
    let limited: Pool<&str> = Pool::new(PoolConfig::single_use(1, 0));
    let r = limited.reserve(-1).unwrap();
    r.enable("one-shot").unwrap();

    let entry = limited.acquire().unwrap();
    let reusable = limited.release(&entry);
    println!("Entry reusable after one acquisition: {reusable}");
    if !reusable {
        limited.remove(&entry);
    }
    println!("Pool size after retirement: {}", limited.size());

    println!("\n=== Pool Statistics ===\n");
    let stats = pool.stats();
    println!(
        "pending={} idle={} in_use={} size={} closed={}",
        stats.pending, stats.idle, stats.in_use, stats.size, stats.is_closed
    );

    Ok(())
}
