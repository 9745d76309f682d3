//! Trace-driven cache simulator CLI.
//!
//! This binary stands in for the CPU emulator: it reads a memory access trace,
//! feeds every access through a configured cache hierarchy and prints the
//! resulting statistics. It performs:
//! 1. **Configuration:** JSON hierarchy file, overridden by per-cache geometry strings.
//! 2. **Simulation:** One hierarchy access per trace record.
//! 3. **Reporting:** Summary table or JSON on stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::{AccessType, PhysAddr};
use cachesim_core::config::{CacheConfig, CacheHierarchyConfig};
use cachesim_core::CacheHierarchy;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven L1/L2 cache simulator",
    long_about = "Feed a memory access trace through a simulated cache hierarchy.\n\nTrace records are '<kind> <address>' with kind I/L/S (or 0/1/2). Addresses are decimal unless prefixed with 0x or --hex is given.\n\nExamples:\n  cachesim -t app.trace --icache 4x256_2w_lru --dcache 2x1024_dm\n  cachesim -t app.trace -c hierarchy.json --l2cache 8x32768_4w_rnd --json"
)]
struct Cli {
    /// Access trace to simulate ('-' for stdin).
    #[arg(short, long)]
    trace: String,

    /// JSON hierarchy configuration.
    #[arg(short, long)]
    config: Option<String>,

    /// Instruction cache geometry, e.g. 4x256_2w_lru.
    #[arg(long)]
    icache: Option<CacheConfig>,

    /// Data cache geometry, e.g. 2x1024_dm.
    #[arg(long)]
    dcache: Option<CacheConfig>,

    /// Unified L2 geometry, e.g. 8x32768_4w_rnd. Enables L2 lookups.
    #[arg(long)]
    l2cache: Option<CacheConfig>,

    /// Never consult L2, even if configured.
    #[arg(long)]
    no_l2: bool,

    /// Accept geometries outside the hardware size ranges.
    #[arg(long)]
    relaxed: bool,

    /// Seed for random replacement.
    #[arg(long)]
    seed: Option<u64>,

    /// Read unprefixed trace addresses as hex instead of decimal.
    #[arg(long)]
    hex: bool,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let mut hierarchy = CacheHierarchy::new(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let reader: Box<dyn BufRead> = if cli.trace == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        match File::open(&cli.trace) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error reading trace {}: {}", cli.trace, e);
                process::exit(1);
            }
        }
    };

    let mut accesses = 0u64;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("Error reading trace {}: {}", cli.trace, e);
            process::exit(1);
        });
        let (kind, addr) = match parse_record(&line, cli.hex) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}:{}: {}", cli.trace, lineno + 1, e);
                process::exit(1);
            }
        };
        if let Err(fault) = hierarchy.access(addr, kind) {
            eprintln!("\n[!] FATAL CACHE FAULT at record {}: {}", lineno + 1, fault);
            hierarchy.stats().print();
            process::exit(1);
        }
        accesses += 1;
    }

    tracing::info!(accesses, "trace complete");
    report(&hierarchy, cli.json);
}

/// Builds the hierarchy configuration from the JSON file and command-line overrides.
fn load_config(cli: &Cli) -> Result<CacheHierarchyConfig, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("reading config {path}: {e}"))?;
            CacheHierarchyConfig::from_json(&text).map_err(|e| format!("{path}: {e}"))?
        }
        None => CacheHierarchyConfig::default(),
    };

    if cli.icache.is_some() {
        config.l1_i = cli.icache;
    }
    if cli.dcache.is_some() {
        config.l1_d = cli.dcache;
    }
    if cli.l2cache.is_some() {
        config.l2 = cli.l2cache;
        config.l2_enabled = true;
    }
    if cli.no_l2 {
        config.l2_enabled = false;
    }
    if cli.relaxed {
        config.strict_limits = false;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Prints the final statistics.
fn report(hierarchy: &CacheHierarchy, json: bool) {
    let stats = hierarchy.stats();
    if json {
        match serde_json::to_string_pretty(&stats) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error encoding statistics: {e}");
                process::exit(1);
            }
        }
    } else {
        stats.print();
    }
}

/// Parses one trace record. Blank lines and `#` comments yield `Ok(None)`.
///
/// A `0x` prefix always means hex; otherwise `hex` picks the radix for the
/// whole trace.
fn parse_record(line: &str, hex: bool) -> Result<Option<(AccessType, PhysAddr)>, String> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let kind = match fields.next() {
        Some("I" | "i" | "0") => AccessType::Fetch,
        Some("L" | "l" | "1") => AccessType::Load,
        Some("S" | "s" | "2") => AccessType::Store,
        Some(other) => return Err(format!("unknown access kind '{other}'")),
        None => return Ok(None),
    };

    let addr = fields.next().ok_or("missing address")?;
    let value = match addr.strip_prefix("0x").or_else(|| addr.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => u64::from_str_radix(addr, if hex { 16 } else { 10 }),
    }
    .map_err(|e| format!("bad address '{addr}': {e}"))?;

    Ok(Some((kind, PhysAddr::new(value))))
}
