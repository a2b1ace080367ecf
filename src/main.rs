//! CLI entry point for deplist

use std::io;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use deplist::{
    BuildContext, GoResolver, ImportWalker, OutputConfig, OutputFormat, WalkConfig, build_sink,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "deplist")]
#[command(about = "Print the transitive imports of Go packages and where their sources live")]
#[command(version)]
struct Args {
    /// Package directories to start from
    #[arg(required = true, value_name = "DIRS")]
    dirs: Vec<PathBuf>,

    /// Comma-separated list of build tags to apply
    #[arg(long = "tags", value_name = "LIST", default_value = "")]
    tags: String,

    /// Include imports in GOROOT
    #[arg(
        long = "goroot",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_go_bool
    )]
    goroot: bool,

    /// Use only a single tab between columns
    #[arg(
        long = "tsv",
        conflicts_with = "json",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_go_bool
    )]
    tsv: bool,

    /// Output one JSON object per line
    #[arg(
        long = "json",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_go_bool
    )]
    json: bool,

    /// Add a column with the canonical import path of each package
    #[arg(
        long = "canonical",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_go_bool
    )]
    canonical: bool,

    /// Log resolution details to stderr (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Boolean flag values in the forms `-flag=value` accepts in Go.
fn parse_go_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("invalid boolean value {:?}", value)),
    }
}

/// Long flags that are also accepted with a single dash, as in `-tags=x`.
const SINGLE_DASH_FLAGS: &[&str] = &["tags", "goroot", "tsv", "json", "canonical"];

/// Rewrite `-tags`, `-goroot` and friends to their `--` form so clap does
/// not read them as bundles of short flags.
fn normalize_flags(args: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen_terminator = false;
    args.into_iter()
        .map(|arg| {
            if seen_terminator {
                return arg;
            }
            if arg == "--" {
                seen_terminator = true;
                return arg;
            }
            let Some(rest) = arg.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if SINGLE_DASH_FLAGS.contains(&name) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::try_parse_from(normalize_flags(std::env::args())).unwrap_or_else(|e| {
        // Usage goes to stderr and exits 1, help included.
        if e.kind() == ErrorKind::DisplayVersion {
            print!("{}", e.render());
            process::exit(0);
        }
        eprint!("{}", e.render());
        process::exit(1);
    });

    init_logging(args.verbose);

    let ctx = BuildContext::from_env().with_build_tags(&args.tags);
    let resolver = GoResolver::new(ctx);

    let format = if args.json {
        OutputFormat::Json
    } else if args.tsv {
        OutputFormat::Tsv
    } else {
        OutputFormat::Aligned
    };
    let output_config = OutputConfig {
        format,
        canonical: args.canonical,
        ..Default::default()
    };

    let walk_config = WalkConfig {
        include_goroot: args.goroot,
    };

    let mut sink = build_sink(output_config, io::stdout().lock());
    let mut walker = ImportWalker::new(resolver, walk_config);

    if let Err(e) = walker.run(&args.dirs, sink.as_mut()) {
        eprintln!("deplist: {}", e);
        process::exit(1);
    }
}
