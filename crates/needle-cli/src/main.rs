//! Needle JSON subset checker CLI
//!
//! Checks that a haystack JSON document contains everything described by a
//! needle document, including `@name(args)` matcher directives.
//!
//! Usage:
//!   needle-check <NEEDLE> <HAYSTACK> [OPTIONS]
//!
//! Either document may be `-` to read it from stdin. Exit status is 0 when the
//! haystack matches and 1 when it does not. Usage, I/O and decode errors exit
//! with 2, as do malformed directives and bad directive arguments.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use needle_match::{Comparator, ComparatorConfig, ComparisonFailure};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const STDIN: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Needle JSON subset checker
#[derive(Parser, Debug)]
#[command(name = "needle-check")]
#[command(
    author,
    version,
    about = "Check that a JSON document contains a needle pattern"
)]
struct Args {
    /// Needle document (the expected pattern), or `-` for stdin
    needle: String,

    /// Haystack document (the actual data), or `-` for stdin
    haystack: String,

    /// Comparator configuration file (YAML or JSON)
    #[arg(short, long, env = "NEEDLE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Show a unified diff of needle and haystack on mismatch
    #[arg(short, long)]
    diff: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a ComparisonFailure>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(failure) => {
            print_report(&args, failure.as_ref());
            ExitCode::from(exit_status(failure.as_ref()))
        }
        Err(e) => {
            eprintln!("{RED}{BOLD}Error:{RESET} {e:#}");
            ExitCode::from(2)
        }
    }
}

/// 0 on a match, 1 on a mismatch, 2 when the needle itself is unusable.
fn exit_status(failure: Option<&ComparisonFailure>) -> u8 {
    match failure {
        None => 0,
        Some(failure) if failure.is_mismatch() => 1,
        Some(_) => 2,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load both documents and compare them. `Ok(Some(_))` is a mismatch.
fn run(args: &Args) -> anyhow::Result<Option<ComparisonFailure>> {
    if args.needle == STDIN && args.haystack == STDIN {
        anyhow::bail!("Only one of the needle and the haystack can be read from stdin");
    }

    let comparator = build_comparator(args.config.as_ref())?;
    let needle = load_document("needle", &args.needle)?;
    let haystack = load_document("haystack", &args.haystack)?;

    debug!(needle = %args.needle, haystack = %args.haystack, "comparing documents");
    Ok(comparator.compare(&needle, &haystack).err())
}

fn build_comparator(config: Option<&PathBuf>) -> anyhow::Result<Comparator> {
    match config {
        Some(path) => ComparatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .build(),
        None => Ok(Comparator::default()),
    }
}

fn load_document(side: &str, source: &str) -> anyhow::Result<Value> {
    let contents = if source == STDIN {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| format!("Failed to read {side} from stdin"))?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read {side} file {source}"))?
    };

    serde_json::from_str(&contents).with_context(|| format!("The {side} is not valid JSON"))
}

fn print_report(args: &Args, failure: Option<&ComparisonFailure>) {
    match args.output {
        OutputFormat::Json => print_report_json(failure),
        OutputFormat::Text => print_report_text(failure, args.diff),
    }
}

fn print_report_json(failure: Option<&ComparisonFailure>) {
    let report = Report {
        matched: failure.is_none(),
        failure,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(output) => println!("{output}"),
        Err(e) => eprintln!("{RED}Error:{RESET} failed to serialize report: {e}"),
    }
}

fn print_report_text(failure: Option<&ComparisonFailure>, show_diff: bool) {
    let Some(failure) = failure else {
        println!("{GREEN}{BOLD}Haystack contains the needle{RESET}");
        return;
    };

    println!(
        "{RED}{BOLD}FAIL{RESET} {DIM}[{RESET}{CYAN}{}{RESET}{DIM}]{RESET} {BOLD}{}{RESET}",
        failure.path(),
        failure.kind().label()
    );

    if !show_diff {
        println!("{failure}");
        return;
    }

    println!("{}", failure.message());
    match failure.diff() {
        Some(diff) => {
            println!();
            for line in diff.lines() {
                println!("{}", colorize_diff_line(line));
            }
        }
        None => println!("{YELLOW}No document context to diff{RESET}"),
    }
}

fn colorize_diff_line(line: &str) -> String {
    if line.starts_with("+++") || line.starts_with("---") {
        format!("{BOLD}{line}{RESET}")
    } else if line.starts_with('+') {
        format!("{GREEN}{line}{RESET}")
    } else if line.starts_with('-') {
        format!("{RED}{line}{RESET}")
    } else if line.starts_with("@@") {
        format!("{CYAN}{line}{RESET}")
    } else {
        line.to_string()
    }
}
