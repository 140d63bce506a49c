use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::counters::Counters;
use crate::error::{Error, Result};
use crate::simulator::{AccessKind, Outcome, Reference};

static TRACE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([ILSM])\s+([0-9a-fA-F]+)\s*,\s*([0-9]+)\s*$")
        .expect("trace line pattern is valid")
});

/// A parsed trace line: either a data reference or an instruction fetch to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEntry {
    Data(Reference),
    Instruction,
}

/// Parse one trace line. Blank lines yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<TraceEntry>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let malformed = || Error::MalformedTrace {
        line: line_no,
        text: line.to_string(),
    };
    let cap = TRACE_LINE.captures(line).ok_or_else(malformed)?;

    let kind = match &cap[1] {
        "I" => return Ok(Some(TraceEntry::Instruction)),
        "L" => AccessKind::Load,
        "S" => AccessKind::Store,
        _ => AccessKind::Modify,
    };
    let address = u64::from_str_radix(&cap[2], 16).map_err(|_| malformed())?;
    let size = cap[3].parse::<u32>().map_err(|_| malformed())?;

    Ok(Some(TraceEntry::Data(Reference {
        kind,
        address,
        size,
    })))
}

/// Streams data references out of a trace, skipping instruction fetches.
pub struct TraceReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    current: String,
    instructions: u64,
}

impl TraceReader<Box<dyn BufRead>> {
    /// Open a trace file; `.zst` files are decompressed on the fly.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let compressed = path.extension().is_some_and(|ext| ext == "zst");
        let inner: Box<dyn Read> = if compressed {
            Box::new(zstd::stream::read::Decoder::new(file)?)
        } else {
            Box::new(file)
        };
        info!(path = %path.display(), compressed, "opened trace");
        Ok(Self::new(Box::new(BufReader::new(inner))))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            current: String::new(),
            instructions: 0,
        }
    }

    /// Raw text of the line that produced the last reference, as written in the trace.
    pub fn current_line(&self) -> &str {
        &self.current
    }

    /// Instruction fetches dropped so far.
    pub fn instructions_skipped(&self) -> u64 {
        self.instructions
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Reference>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.next()?;
            self.line_no += 1;
            let line = match next {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(Error::TraceRead {
                        line: self.line_no,
                        source,
                    }));
                }
            };
            match parse_line(self.line_no, &line) {
                Ok(Some(TraceEntry::Data(reference))) => {
                    self.current = line;
                    return Some(Ok(reference));
                }
                Ok(Some(TraceEntry::Instruction)) => self.instructions += 1,
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Final totals in the `hits:<h> misses:<m> evictions:<e>` form.
pub fn format_summary(counters: &Counters) -> String {
    format!(
        "hits:{} misses:{} evictions:{}",
        counters.hits, counters.misses, counters.evictions
    )
}

/// One verbose line: the trace text followed by its events, e.g. `L 10,1 miss eviction`.
pub fn format_verbose(trace_text: &str, outcome: &Outcome) -> String {
    format!("{} {}", trace_text.trim(), outcome)
}

pub fn print_summary(counters: &Counters) {
    println!("{}", format_summary(counters));
}

/// Write the totals as a single CSV record with a header row.
pub fn write_results(path: &Path, counters: &Counters) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.serialize(counters)?;
    writer.flush()?;
    Ok(())
}
