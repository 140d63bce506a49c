use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "csim",
    version = "0.1",
    about = "Set-associative LRU cache simulator for memory reference traces"
)]
pub struct Cli {
    /// Number of set index bits (the cache has 2^s sets)
    #[arg(short = 's', long = "set-bits", required = true)]
    pub set_bits: u32,

    /// Associativity, number of lines per set
    #[arg(short = 'E', long, required = true)]
    pub associativity: usize,

    /// Number of block offset bits (blocks are 2^b bytes)
    #[arg(short = 'b', long = "block-bits", required = true)]
    pub block_bits: u32,

    /// Trace file to replay (`.zst` files are decompressed)
    #[arg(short = 't', long, required = true)]
    pub trace: PathBuf,

    /// Print the outcome of every reference
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write the totals to this CSV file
    #[arg(short = 'r', long)]
    pub results: Option<PathBuf>,
}
