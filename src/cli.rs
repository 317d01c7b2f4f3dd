use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{resolve_config_path, RunConfig};
use crate::data::validate::{validate_catalog, validate_table, ValidationReport};
use crate::pipeline::{load_lookups, load_table, run_annotation, AnnotateRequest};

#[derive(Debug, Parser)]
#[command(name = "spellclass")]
#[command(about = "Annotate spell records with classes and subclasses derived from their backgrounds")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Annotate a spell file and write the result (stdout when --output is omitted)
    Annotate(AnnotateArgs),
    /// Print the background lookups built from a table as JSON
    Inspect(TableArgs),
    /// Check the class catalog and a table for problems
    Validate(TableArgs),
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// YAML run config (defaults to $SPELLCLASS_CONFIG, then data/spellclass.yaml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Workbook sheet holding the background table
    #[arg(long)]
    pub sheet: Option<String>,

    /// Log per-spell progress to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct AnnotateArgs {
    /// Spell collection JSON (top-level "spell" array)
    #[arg(long, short = 's')]
    pub spells: PathBuf,

    /// Background table (.xlsx, .xls, .ods or .csv)
    #[arg(long, short = 't')]
    pub table: PathBuf,

    /// Destination for the updated JSON
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct TableArgs {
    /// Background table (.xlsx, .xls, .ods or .csv)
    #[arg(long, short = 't')]
    pub table: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parse `args` (program name first) and run. Returns the process exit code:
/// 0 on success, 1 on a failed run, 2 on a usage error.
pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return code;
        }
    };

    match cli.command {
        Command::Annotate(args) => handle_annotate(args),
        Command::Inspect(args) => handle_inspect(args),
        Command::Validate(args) => handle_validate(args),
    }
}

fn load_config(common: &CommonArgs) -> Option<RunConfig> {
    let path = resolve_config_path(common.config.as_deref());
    match RunConfig::load(&path) {
        Ok(config) => {
            init_logging(config.verbose || common.verbose);
            tracing::debug!(path = %path.display(), classes = config.classes.len(), "loaded config");
            Some(config)
        }
        Err(err) => {
            init_logging(common.verbose);
            eprintln!("config error: {err}");
            None
        }
    }
}

/// Verbose runs log at info, quiet runs only errors. `RUST_LOG` takes precedence.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_annotate(args: AnnotateArgs) -> i32 {
    let Some(config) = load_config(&args.common) else {
        return 1;
    };
    let request = AnnotateRequest {
        spells_path: args.spells,
        table_path: args.table,
        output_path: args.output,
        sheet_name: args.common.sheet,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_annotation(&config, &request, &mut out) {
        Ok(report) => {
            eprintln!(
                "annotation complete: spells={}, annotated={}, skipped={}, failed={}",
                report.total_spells,
                report.annotated,
                report.skipped(),
                report.failures.len()
            );
            0
        }
        Err(err) => {
            eprintln!("annotation failed: {err}");
            1
        }
    }
}

fn handle_inspect(args: TableArgs) -> i32 {
    let Some(config) = load_config(&args.common) else {
        return 1;
    };
    let (_, lookups) = match load_lookups(&config, &args.table, args.common.sheet.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("inspect failed: {err}");
            return 1;
        }
    };

    match serde_json::to_string_pretty(&lookups) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize lookups: {err}");
            1
        }
    }
}

fn handle_validate(args: TableArgs) -> i32 {
    let Some(config) = load_config(&args.common) else {
        return 1;
    };
    let table = match load_table(&config, &args.table, args.common.sheet.as_deref()) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    let mut report = validate_catalog(&config.classes);
    report.extend(validate_table(&table, &config.classes, &config.valid_backgrounds));
    let report = report.sorted();
    print_report(&report, &args.table);

    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        1
    } else {
        println!("validation passed: {}", args.table.display());
        0
    }
}

fn print_report(report: &ValidationReport, table: &Path) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(
        out,
        "{}: {} diagnostic(s)",
        table.display(),
        report.diagnostics.len()
    );
    for diag in &report.diagnostics {
        let _ = writeln!(out, "- {diag}");
    }
}
