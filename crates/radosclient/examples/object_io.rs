//! Object round-trip demo against the in-memory backend.
//!
//! Connects, creates a pool, writes an object positionally, reads it back
//! and prints pool usage.
//!
//! Usage:
//!   cargo run --package radosclient --example object_io

use radosclient::Cluster;
use transport::mem::MemConnector;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cluster = Cluster::connect::<MemConnector>(None)?;
    println!(
        "connected: {} KB capacity, {} KB used",
        cluster.size(),
        cluster.used()
    );

    cluster.pool_create("demo")?;
    let ctx = cluster.io_context("demo")?;

    let mut obj = ctx.create("greeting")?;
    obj.put(b"hello, cluster")?;
    obj.write_at(b"HELLO", 0)?;
    let body = obj.get()?;
    println!("{} is {:?}", obj.name(), body);

    let info = ctx.pool_stat()?;
    println!(
        "pool {} holds {} object(s), {} byte(s)",
        ctx.pool(),
        info.num_objects,
        info.bytes_used
    );

    obj.remove()?;
    Ok(())
}
