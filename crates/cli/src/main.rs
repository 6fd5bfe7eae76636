//! Memory-subsystem simulator CLI.
//!
//! This binary drives the cycle-accurate memory subsystem with randomized
//! CPU traffic against a software golden model. It performs:
//! 1. **Cached phase:** Locality-heavy random read/write blocks through the
//!    data cache, then a manual flush and a whole-region RAM comparison.
//! 2. **Bypass phase:** Random single-beat traffic through the non-cacheable
//!    range, compared against the lite RAM.
//! 3. **Report:** Statistics (hits, misses, write-backs, stalls) on exit.

use clap::{Parser, Subcommand};
use std::{fs, process};

use memsim_core::config::Config;
use memsim_core::core::cache::CpuRequest;
use memsim_core::core::cache::instr::InstrReq;
use memsim_core::{MemorySubsystem, MemError};

/// Tick bound before an operation is declared deadlocked.
const DEADLOCK_THRESHOLD: usize = 10_000;

#[derive(Parser, Debug)]
#[command(
    name = "memsim",
    version,
    about = "Cycle-accurate cache and memory-subsystem simulator",
    long_about = "Drive the memory subsystem with randomized traffic and verify it against a golden model.\n\nExamples:\n  memsim run\n  memsim run --ops 10000 --seed 42\n  memsim run --config soc.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the randomized stress scenario.
    Run {
        /// JSON configuration file (defaults used when omitted).
        #[arg(short, long)]
        config: Option<String>,

        /// Number of mixed read/write operations in the cached phase.
        #[arg(long, default_value_t = 5000)]
        ops: usize,

        /// Number of operations in the bypass phase.
        #[arg(long, default_value_t = 1000)]
        bypass_ops: usize,

        /// PRNG seed.
        #[arg(long, default_value_t = 0x5EED)]
        seed: u64,

        /// Size in bytes of the exercised address region.
        #[arg(long, default_value_t = 8192)]
        region: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run {
            config,
            ops,
            bypass_ops,
            seed,
            region,
        }) => cmd_run(config.as_deref(), ops, bypass_ops, seed, region),
        None => {
            eprintln!("memsim — pass a subcommand");
            eprintln!();
            eprintln!("  memsim run [--ops N] [--seed S] [--config FILE]");
            eprintln!();
            eprintln!("  memsim --help  for full options");
            process::exit(1);
        }
    }
}

/// Loads the configuration, runs both stress phases, and reports.
fn cmd_run(config_path: Option<&str>, ops: usize, bypass_ops: usize, seed: u64, region: usize) {
    let config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config {path}: {e}");
                process::exit(1);
            });
            serde_json::from_str::<Config>(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing config {path}: {e}");
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    if region < 64
        || region % 4 != 0
        || region > config.memory.main_size
        || region > config.memory.lite_size
    {
        eprintln!("Error: region must be word-sized and fit in both backing stores");
        process::exit(1);
    }

    let mut sub = match MemorySubsystem::new(&config) {
        Ok(sub) => sub,
        Err(e) => {
            eprintln!("Error building subsystem: {e}");
            process::exit(1);
        }
    };

    println!(
        "[*] Cached phase: {ops} ops over {region} bytes (seed {seed:#x}, \
         L1D {} B / {}-way, line {} B)",
        config.cache.l1_d.size_bytes, config.cache.l1_d.ways, config.cache.l1_d.line_bytes
    );
    let mut rng = XorShift64::new(seed);
    let cached_errors = cached_phase(&mut sub, &mut rng, ops, region);

    println!("[*] Bypass phase: {bypass_ops} ops over the non-cacheable range");
    let bypass_errors = bypass_phase(&mut sub, &mut rng, bypass_ops, region);

    println!();
    print!("{}", sub.stats());
    println!();

    if cached_errors + bypass_errors == 0 {
        println!("[*] PASS: golden model and backing stores agree");
    } else {
        println!(
            "[!] FAIL: {cached_errors} cached and {bypass_errors} bypass mismatches"
        );
        process::exit(1);
    }
}

/// Random locality-heavy traffic through the cache, flush, then compare the
/// burst RAM against the golden model. Returns the mismatch count.
fn cached_phase(
    sub: &mut MemorySubsystem,
    rng: &mut XorShift64,
    ops: usize,
    region: usize,
) -> usize {
    let words = region / 4;
    let mut golden = Vec::with_capacity(words);
    for i in 0..words {
        let word = rng.next_u32();
        sub.ram().write_u32((i * 4) as u32, word);
        golden.push(word);
    }

    let mut done = 0usize;
    while done < ops {
        // A block of nearby operations, like a hot loop's working set.
        let base = rng.below(words.saturating_sub(8).max(1));
        for _ in 0..8 {
            let index = (base + rng.below(5)).min(words - 1);
            let addr = (index * 4) as u32;
            if rng.next_u64() & 1 == 0 {
                let got = data_read(sub, addr);
                if got != golden[index] {
                    eprintln!(
                        "[!] read mismatch at {addr:#010x}: expected {:#010x}, got {got:#010x}",
                        golden[index]
                    );
                    return 1;
                }
            } else {
                let value = rng.next_u32();
                data_write(sub, addr, value);
                golden[index] = value;
            }
            done += 1;
        }
    }

    flush_and_drain(sub);

    let mut mismatches = 0usize;
    for (i, &expected) in golden.iter().enumerate() {
        let actual = sub.ram().read_u32((i * 4) as u32);
        if actual != expected {
            if mismatches < 10 {
                eprintln!(
                    "[!] memory mismatch at {:#010x}: expected {expected:#010x}, got {actual:#010x}",
                    i * 4
                );
            }
            mismatches += 1;
        }
    }
    mismatches
}

/// Random single-beat traffic through the non-cacheable range, compared
/// against the lite RAM. Returns the mismatch count.
fn bypass_phase(
    sub: &mut MemorySubsystem,
    rng: &mut XorShift64,
    ops: usize,
    region: usize,
) -> usize {
    if let Err(e) = sub.set_non_cacheable_range(0, region as u32) {
        report_setup_error(&e);
    }

    let words = region / 4;
    let mut golden = Vec::with_capacity(words);
    for i in 0..words {
        let word = rng.next_u32();
        sub.lite_ram().write_u32((i * 4) as u32, word);
        golden.push(word);
    }

    for _ in 0..ops {
        let index = rng.below(words);
        let addr = (index * 4) as u32;
        if rng.next_u64() & 1 == 0 {
            let got = data_read(sub, addr);
            if got != golden[index] {
                eprintln!(
                    "[!] bypass read mismatch at {addr:#010x}: expected {:#010x}, got {got:#010x}",
                    golden[index]
                );
                return 1;
            }
        } else {
            let value = rng.next_u32();
            data_write(sub, addr, value);
            golden[index] = value;
        }
    }

    let mut mismatches = 0usize;
    for (i, &expected) in golden.iter().enumerate() {
        if sub.lite_ram().read_u32((i * 4) as u32) != expected {
            mismatches += 1;
        }
    }
    mismatches
}

/// Drives one data request to completion.
fn data_op(sub: &mut MemorySubsystem, req: &CpuRequest) -> Option<u32> {
    for _ in 0..DEADLOCK_THRESHOLD {
        let out = sub.tick(&InstrReq::default(), false, req);
        if !out.data.stall {
            return out.data.read_data;
        }
    }
    eprintln!("[!] deadlock: request at {:#010x} never completed", req.addr);
    process::exit(1);
}

fn data_read(sub: &mut MemorySubsystem, addr: u32) -> u32 {
    match data_op(sub, &CpuRequest::read(addr)) {
        Some(word) => word,
        None => {
            eprintln!("[!] read at {addr:#010x} completed without data");
            process::exit(1);
        }
    }
}

fn data_write(sub: &mut MemorySubsystem, addr: u32, value: u32) {
    let _ = data_op(sub, &CpuRequest::write(addr, value, 0b1111));
}

/// Orders a flush and ticks until the data path is quiescent.
fn flush_and_drain(sub: &mut MemorySubsystem) {
    sub.flush();
    for _ in 0..DEADLOCK_THRESHOLD {
        let out = sub.tick(&InstrReq::default(), false, &CpuRequest::default());
        if !out.data.stall {
            return;
        }
    }
    eprintln!("[!] deadlock: flush never completed");
    process::exit(1);
}

fn report_setup_error(e: &MemError) -> ! {
    eprintln!("Error: {e}");
    process::exit(1);
}

/// Deterministic xorshift PRNG for reproducible stimulus.
#[derive(Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}
