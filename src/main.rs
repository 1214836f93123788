use anyhow::Result;
use bioasq_meta::config::{ExtractorConfig, PagePolicy, SchemaDispatch};
use bioasq_meta::diagnostics::TracingDiagnostics;
use bioasq_meta::extract::{run_extraction, Extractor};
use bioasq_meta::models::OutputMode;
use bioasq_meta::stats::ExtractionStats;
use bioasq_meta::{export, loader, merge};
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "bioasq-meta")]
#[command(about = "Extract bibliographic metadata from PubMed citation XML")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metadata and write it as CSV
    Extract(ExtractArgs),
    /// Extract metadata and merge it into a JSONL corpus by id
    Merge(MergeArgs),
}

#[derive(Args)]
struct StrategyArgs {
    /// How reversed page ranges are counted
    #[arg(long, value_enum, default_value_t = PagePolicy::Capped)]
    page_policy: PagePolicy,

    /// Which citation schemas are recognized
    #[arg(long, value_enum, default_value_t = SchemaDispatch::ArticleThenBook)]
    dispatch: SchemaDispatch,
}

impl StrategyArgs {
    fn config(&self) -> ExtractorConfig {
        ExtractorConfig {
            page_policy: self.page_policy,
            dispatch: self.dispatch,
        }
    }
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the source .jsonl file
    #[arg(long)]
    source_path: String,

    /// Path to the .csv file where the results should be placed
    #[arg(long)]
    save_path: String,

    #[command(flatten)]
    strategy: StrategyArgs,
}

#[derive(Args)]
struct MergeArgs {
    /// Path to the source .jsonl file
    #[arg(long)]
    source_path: String,

    /// Corpus .jsonl file whose examples carry an `id`
    #[arg(long)]
    corpus: String,

    /// Path for the merged corpus
    #[arg(short, long)]
    output: String,

    #[command(flatten)]
    strategy: StrategyArgs,
}

fn print_extraction_summary(stats: &ExtractionStats, elapsed_secs: f64) {
    println!();
    println!("=== Summary ===");
    println!("Extraction time:    {:.2}s", elapsed_secs);
    println!("Records processed:  {}", stats.records());
    println!("Articles:           {}", stats.articles());
    println!("Books:              {}", stats.books());
    println!("Unrecognized:       {}", stats.unrecognized());
    println!("Field fallbacks:    {}", stats.fallbacks());
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    info!("Parsing the XML source file");
    let records = loader::load(&args.source_path)?;

    let start = Instant::now();
    let stats = ExtractionStats::new();
    let diagnostics = TracingDiagnostics;
    let extractor = Extractor::new(args.strategy.config(), &diagnostics).with_stats(&stats);
    let metadata = run_extraction(&records, &extractor, OutputMode::Flattened);

    let rows = export::write_csv(&args.save_path, &metadata)?;

    print_extraction_summary(&stats, start.elapsed().as_secs_f64());
    println!("Rows written:       {}", rows);
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<()> {
    info!("Parsing the XML source file");
    let records = loader::load(&args.source_path)?;

    let start = Instant::now();
    let stats = ExtractionStats::new();
    let diagnostics = TracingDiagnostics;
    let extractor = Extractor::new(args.strategy.config(), &diagnostics).with_stats(&stats);
    let metadata = run_extraction(&records, &extractor, OutputMode::Structured);

    info!("Adding metadata to the corpus");
    let summary = merge::merge_corpus(&args.corpus, &args.output, &metadata)?;

    print_extraction_summary(&stats, start.elapsed().as_secs_f64());
    println!("Corpus examples:    {}", summary.examples);
    println!("Examples merged:    {}", summary.merged);
    println!("Without metadata:   {}", summary.without_metadata);
    println!("Non-positive pages: {}", summary.non_positive_pages);
    Ok(())
}

/// Log directive for a `-v` count, used when `RUST_LOG` is unset.
fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directive(cli.verbose)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Merge(args) => run_merge(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
