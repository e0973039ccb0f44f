//! QuickFit demo driver
//!
//! Runs allocator sessions from the command line:
//! - `demo`: the reference allocate/free/reuse sequence
//! - `replay`: a script of `alloc`/`free`/`status` commands
//! - `status`: the report for a freshly built allocator
//!
//! # Examples
//!
//! ```bash
//! quickfit demo
//! quickfit --sizes 8,16,32 replay session.txt
//! echo "alloc 16" | quickfit --json replay -
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use quickfit::config::{parse_sizes, AllocatorConfig};
use quickfit::replay::{parse_script, Outcome, Replay};
use quickfit::{AllocatorStatus, BlockId, QuickFitAllocator};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// QuickFit - fixed size-class allocator
#[derive(Parser, Debug)]
#[command(name = "quickfit")]
#[command(version = quickfit::VERSION)]
#[command(about = "Fixed size-class (quick-fit) allocator demo", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Comma separated size classes (overrides QUICKFIT_SIZES)
    #[arg(long, global = true)]
    sizes: Option<String>,

    /// Maximum blocks minted per size class (overrides QUICKFIT_MAX_BLOCKS)
    #[arg(long, global = true)]
    max_blocks: Option<u64>,

    /// Print status reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the reference allocation sequence
    Demo,

    /// Run a command script (`-` reads stdin)
    Replay {
        /// Script path
        script: PathBuf,
    },

    /// Show the status of a fresh allocator
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli);

    let config = build_config(&cli)?;
    let mut allocator = QuickFitAllocator::with_config(config)?;

    match &cli.command {
        Commands::Demo => demo_command(&mut allocator, cli.json),
        Commands::Replay { script } => replay_command(&mut allocator, script, cli.json),
        Commands::Status => {
            print!("{}", render(&[Entry::Status(allocator.status())], cli.json)?);
            Ok(())
        }
    }
}

/// Setup console logging
fn setup_logging(cli: &Cli) {
    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();
}

/// Environment configuration with command-line flags on top
fn build_config(cli: &Cli) -> anyhow::Result<AllocatorConfig> {
    let mut config = AllocatorConfig::from_env()?;
    if let Some(sizes) = &cli.sizes {
        config.sizes = parse_sizes(sizes)?;
    }
    if let Some(limit) = cli.max_blocks {
        config.max_blocks_per_class = Some(limit);
    }
    config.validate()?;
    Ok(config)
}

/// One piece of command output
#[derive(Debug)]
enum Entry {
    Line(String),
    Status(AllocatorStatus),
}

/// Text mode prints every entry in order. JSON mode emits a single array
/// of status snapshots and sends the narrative lines to the log.
fn render(entries: &[Entry], json: bool) -> anyhow::Result<String> {
    if json {
        let mut snapshots = Vec::new();
        for entry in entries {
            match entry {
                Entry::Line(line) => info!("{}", line),
                Entry::Status(status) => snapshots.push(status),
            }
        }
        return Ok(format!("{}\n", serde_json::to_string_pretty(&snapshots)?));
    }

    let mut out = String::new();
    for entry in entries {
        match entry {
            Entry::Line(line) => {
                out.push_str(line);
                out.push('\n');
            }
            Entry::Status(status) => out.push_str(&status.to_string()),
        }
    }
    Ok(out)
}

/// Allocate, free one block, then reuse it
fn run_demo(allocator: &mut QuickFitAllocator) -> anyhow::Result<Vec<Entry>> {
    let small = allocator.sizes()[0];
    let next = allocator.sizes().get(1).copied().unwrap_or(small);
    info!(small, next, "Running demo sequence");

    let mut entries = Vec::new();
    let first = allocate_logged(allocator, small, &mut entries)?;
    allocate_logged(allocator, next, &mut entries)?;
    allocate_logged(allocator, small, &mut entries)?;
    entries.push(Entry::Status(allocator.status()));

    allocator.deallocate(small, first)?;
    entries.push(Entry::Line(format!("Deallocated block of size {}: {}", small, first)));
    entries.push(Entry::Status(allocator.status()));

    allocate_logged(allocator, small, &mut entries)?;
    entries.push(Entry::Status(allocator.status()));

    Ok(entries)
}

fn allocate_logged(
    allocator: &mut QuickFitAllocator,
    size: usize,
    entries: &mut Vec<Entry>,
) -> anyhow::Result<BlockId> {
    let id = allocator.allocate(size)?;
    entries.push(Entry::Line(format!("Allocated block of size {}: {}", size, id)));
    Ok(id)
}

/// Demo command - run the reference sequence and print it
fn demo_command(allocator: &mut QuickFitAllocator, json: bool) -> anyhow::Result<()> {
    let entries = run_demo(allocator)?;
    print!("{}", render(&entries, json)?);
    Ok(())
}

/// Replay command - run a script, reporting failures without stopping
fn replay_command(
    allocator: &mut QuickFitAllocator,
    path: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let mut script = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut script)?;
    } else {
        script = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
    }

    let commands = parse_script(&script)?;
    info!(commands = commands.len(), "Replaying script");

    let outcomes = Replay::new(allocator).run(&commands);
    let failures = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Failed { .. }))
        .count();

    let entries: Vec<Entry> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            Outcome::Status(status) => Entry::Status(status),
            other => Entry::Line(other.to_string()),
        })
        .collect();
    print!("{}", render(&entries, json)?);

    if failures > 0 {
        info!(failures, "Script finished with rejected commands");
    }
    Ok(())
}
