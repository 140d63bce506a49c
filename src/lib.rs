use tracing::{info, warn};

use crate::cli::Cli;
use crate::counters::Counters;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::io::TraceReader;
use crate::simulator::Simulator;

/// Address splitting into offset, set index and tag
pub mod address;
/// Lines, sets and the cache that owns them
pub mod cache;
pub mod cli;
pub mod counters;
pub mod error;
pub mod geometry;
/// Trace parsing and summary output
pub mod io;
/// Core lookup and replacement protocol
pub mod simulator;
pub mod utils;

/// Replay the trace named by `cli` and return the final totals.
///
/// With `verbose` set every data reference is echoed to stdout followed by
/// its outcome, e.g. `L 10,1 miss eviction`.
pub fn run(cli: &Cli) -> Result<Counters> {
    let geometry = Geometry::new(cli.set_bits, cli.associativity, cli.block_bits)?;
    info!(
        sets = geometry.num_sets(),
        ways = geometry.ways(),
        block_bits = geometry.block_bits(),
        "simulating cache"
    );

    let mut simulator = Simulator::new(geometry)?;
    let mut trace = TraceReader::open(&cli.trace)?;
    let mut counters = Counters::new();
    let mut references = 0u64;

    while let Some(reference) = trace.next() {
        let reference = reference?;
        let outcome = simulator.reference(&reference, &mut counters);
        references += 1;
        if cli.verbose {
            println!("{}", io::format_verbose(trace.current_line(), &outcome));
        }
    }

    let skipped = trace.instructions_skipped();
    if references == 0 && skipped > 0 {
        warn!(skipped, "trace contained only instruction fetches");
    }
    info!(
        references,
        skipped,
        hits = counters.hits,
        misses = counters.misses,
        evictions = counters.evictions,
        hit_ratio = counters.hit_ratio(),
        "trace finished"
    );

    if let Some(path) = &cli.results {
        io::write_results(path, &counters)?;
    }

    Ok(counters)
}
