// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Command-line driver for the sorting network search.
//!
//! Parameters can be given as flags or, where omitted, are prompted for
//! interactively with re-prompting on invalid input. The driver builds
//! the layer-2 candidate list, wraps each candidate in a task, runs the
//! pool to completion and appends the start/finish lines to the run log.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sortnet_search::config::{depth_range, SearchConfig, MAX_DEPTH, MAX_WIDTH, MIN_WIDTH};
use sortnet_search::pool::{SearchTask, TaskPool};
use sortnet_search::report::{self, RunLog};
use sortnet_search::{level2, sorting, ComparatorNetwork, Searcher};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sortnet-search",
    version,
    about = "Exhaustive search for minimal-depth sorting networks"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Number of input channels (prompted for when omitted).
    #[arg(short, long)]
    width: Option<usize>,

    /// Number of comparator layers (prompted for when omitted).
    #[arg(short, long)]
    depth: Option<usize>,

    /// Use the nearsort2 heuristic (depths 5 and up).
    #[arg(long)]
    nearsort2: bool,

    /// Worker threads; defaults to the hardware thread count.
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Directory that receives one file per sorting network found.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Append-only run log.
    #[arg(long, default_value = "log.txt")]
    log: PathBuf,

    /// Count sorting networks without writing files.
    #[arg(long)]
    count_only: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a saved network file is a sorting network.
    Verify {
        /// Network text file in the search's output format.
        file: PathBuf,

        /// Number of input channels of the saved network.
        #[arg(short, long)]
        width: usize,

        /// Number of layers of the saved network.
        #[arg(short, long)]
        depth: usize,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Command::Verify { file, width, depth }) = cli.command {
        return verify(&file, width, depth);
    }

    let width = match cli.width {
        Some(width) => {
            if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
                bail!("width {width} out of range {MIN_WIDTH}..={MAX_WIDTH}");
            }
            width
        }
        None => prompt_number(
            &format!("Width ({MIN_WIDTH}..={MAX_WIDTH}): "),
            |w| (MIN_WIDTH..=MAX_WIDTH).contains(&w),
        )?,
    };

    let range = depth_range(width);
    let (depth, interactive_depth) = match cli.depth {
        Some(depth) => {
            if !range.contains(&depth) {
                bail!(
                    "depth {depth} out of range {}..={} for width {width}",
                    range.start(),
                    range.end()
                );
            }
            (depth, false)
        }
        None => (
            prompt_number(
                &format!("Depth ({}..={}): ", range.start(), range.end()),
                |d| range.contains(&d),
            )?,
            true,
        ),
    };

    // In an interactive session the nearsort2 choice is prompted for
    // wherever it is applicable; flags decide otherwise.
    let nearsort2 = if depth >= 5 && interactive_depth && !cli.nearsort2 {
        prompt_yes_no("Use the nearsort2 heuristic? (y/n): ")?
    } else {
        cli.nearsort2
    };

    let config = SearchConfig::new(width, depth, nearsort2)?;

    let candidates = level2::candidates(width);
    info!(
        width,
        depth,
        heuristic = ?config.heuristic,
        candidates = candidates.len(),
        "starting search"
    );

    let log = RunLog::new(cli.log);
    log.start(width, depth);

    let output_dir = if cli.count_only {
        None
    } else {
        Some(cli.output_dir)
    };

    let mut pool = match cli.workers {
        Some(workers) => TaskPool::with_workers(workers),
        None => TaskPool::new(),
    };

    let started = Instant::now();
    for (index, candidate) in candidates.iter().enumerate() {
        let searcher = Searcher::new(config, candidate, index, output_dir.clone());
        pool.insert(SearchTask::new(searcher));
    }
    pool.spawn()?;
    pool.wait();

    let results = pool.process();
    let elapsed = started.elapsed();

    log.finish(results.found, elapsed, results.cpu_time, results.workers);

    println!(
        "{} {width}-input sorting networks of depth {depth} found in {} using {} CPU time over {} threads",
        results.found,
        report::format_duration(elapsed),
        report::format_duration(results.cpu_time),
        results.workers
    );

    Ok(ExitCode::SUCCESS)
}

/// Parse a saved network and test it against every 0/1 input.
fn verify(file: &PathBuf, width: usize, depth: usize) -> Result<ExitCode> {
    if width < 2 || width > MAX_WIDTH || depth < 1 || depth > MAX_DEPTH {
        bail!("width must be 2..={MAX_WIDTH} and depth 1..={MAX_DEPTH}");
    }

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let network = ComparatorNetwork::parse(width, depth, &text)
        .with_context(|| format!("cannot parse {}", file.display()))?;

    if sorting::sorts(&network) {
        println!("{}: sorts all {width}-channel inputs", file.display());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}: does NOT sort", file.display());
        Ok(ExitCode::FAILURE)
    }
}

/// Prompt until a parseable, valid number arrives.
fn prompt_number(prompt: &str, valid: impl Fn(usize) -> bool) -> Result<usize> {
    loop {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            bail!("unexpected end of input");
        }

        match line.trim().parse() {
            Ok(value) if valid(value) => return Ok(value),
            _ => println!("Out of range, try again."),
        }
    }
}

/// Prompt until a y/n answer arrives.
fn prompt_yes_no(prompt: &str) -> Result<bool> {
    loop {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            bail!("unexpected end of input");
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}
