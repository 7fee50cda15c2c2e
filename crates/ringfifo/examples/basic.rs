//! Walkthrough of the ring buffer lifecycle: fill, wrap, grow, shrink.
//!
//! Run with `RUST_LOG=debug cargo run --example basic` to see storage swaps.

use ringfifo_rs::{Config, RingBuffer, RingError};

fn main() -> Result<(), RingError> {
    env_logger::init();

    println!("RingFIFO Basic Example");
    println!("======================\n");

    let config = Config::new(
        4,    // 4 slots
        true, // metrics enabled
    );
    let mut ring = RingBuffer::<String>::with_config(config)?;

    for word in ["alpha", "beta", "gamma", "delta"] {
        ring.push(word.to_string())?;
    }
    println!("filled:   {:?} (full: {})", ring, ring.is_full());

    if let Err(rejected) = ring.push("epsilon".to_string()) {
        println!("rejected: {:?} ({})", rejected.item, rejected);
    }

    // Pop two, push two: the window now spans the physical seam
    println!("popped:   {}", ring.pop()?);
    println!("popped:   {}", ring.pop()?);
    ring.push("epsilon".to_string())?;
    ring.push("zeta".to_string())?;
    let (front, back) = ring.as_slices();
    println!("wrapped:  front {:?}, back {:?}", front, back);

    ring.reserve(8)?;
    println!("grown:    {:?} (capacity {})", ring, ring.capacity());

    ring.reserve(2)?;
    println!("shrunk:   {:?} (oldest two kept)", ring);

    let m = ring.metrics();
    println!("\nMetrics:");
    println!("  pushed:        {}", m.pushed);
    println!("  popped:        {}", m.popped);
    println!("  rejected:      {}", m.rejected);
    println!("  reallocations: {}", m.reallocations);
    println!("  truncated:     {}", m.truncated);

    Ok(())
}
