use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{miette, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod analysis;
mod catalog;
mod config;
mod index;
mod report;
mod search;

use analysis::{AnalysisOrchestrator, Providers};
use config::Config;
use index::{FileLiteralSearch, ReferenceIndex, Snapshot};
use report::{CollectingSink, Reporter};

/// refaudit - detect unused code, final candidates and reducible visibility
#[derive(Parser, Debug)]
#[command(name = "refaudit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Symbol/reference snapshot (JSON) exported from the build tooling
    snapshot: PathBuf,

    /// Project root scanned by the literal fallback search
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reference counts up to this limit are reported as rarely used
    #[arg(long)]
    warn_limit: Option<usize>,

    /// Treat symbols referenced only from test code as unused
    #[arg(long)]
    detect_test_only: bool,

    /// Enable the plain-text literal fallback search for type names
    #[arg(long)]
    literal: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("refaudit v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    run_analysis(&config, &cli)
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    let snapshot = Snapshot::load(&cli.snapshot)
        .map_err(|error| miette!("Cannot load snapshot {}: {error}", cli.snapshot.display()))?;
    let catalog = snapshot.to_catalog();
    if catalog.is_empty() {
        if !cli.quiet {
            println!("{}", "Snapshot contains no symbols.".yellow());
        }
        return Ok(());
    }
    let index = ReferenceIndex::from_snapshot(&snapshot);
    let literal = FileLiteralSearch::new(&cli.project);

    info!(
        "loaded {} symbols, {} references",
        catalog.symbol_count(),
        index.reference_count()
    );

    let spinner = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner());
        spinner.set_message(format!("Analyzing {} symbols...", catalog.symbol_count()));
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    };

    let orchestrator = AnalysisOrchestrator::new(
        &catalog,
        Providers {
            searcher: &index,
            literal: &literal,
            hierarchy: &index,
        },
        config,
    );
    let mut sink = CollectingSink::new();
    let summary = orchestrator.run(&mut sink);
    spinner.finish_and_clear();

    let (decisions, _) = sink.into_parts();
    let reporter = Reporter::new(cli.format.clone().into(), cli.output.clone());
    reporter.report(&decisions, &summary)?;

    if let Some(reason) = summary.aborted {
        return Err(miette!("analysis aborted: {reason}"));
    }
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.project)?
    };

    // Override with CLI arguments
    if let Some(warn_limit) = cli.warn_limit {
        config.warn_limit = warn_limit;
    }
    if cli.detect_test_only {
        config.detect_test_only = true;
    }
    if cli.literal {
        config.literal.enabled = true;
    }

    Ok(config)
}
