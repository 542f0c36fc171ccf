//! CLI command definitions for rankforge.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::manifest::compile_standard_manifest;
use crate::pipeline::{PipelineConfig, PipelineRunner, RunSummary};

/// Default input CSV produced by the catalog scraper.
const DEFAULT_INPUT: &str = "produits_scrapy.csv";

/// Default directory for run artifacts.
const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Default path for the compiled manifest.
const DEFAULT_MANIFEST: &str = "product_scoring_pipeline.yaml";

/// Product catalog scoring pipeline.
#[derive(Parser)]
#[command(name = "rankforge")]
#[command(about = "Score scraped products and surface the top-K most attractive items")]
#[command(version)]
#[command(
    long_about = "rankforge preprocesses a scraped product catalog, trains a random forest \
to predict a weighted attractiveness score, and exports the fitted model plus the top-5 \
products.\n\nExample usage:\n  rankforge run --input produits_scrapy.csv --output ./output"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the full pipeline: preprocess, score, train, export.
    Run(RunArgs),

    /// Compile the pipeline into a YAML manifest without executing it.
    Compile(CompileArgs),
}

/// Arguments for `rankforge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Input CSV of scraped products.
    #[arg(short = 'i', long, default_value = DEFAULT_INPUT, env = "RANKFORGE_INPUT")]
    pub input: PathBuf,

    /// Output directory for the model and top-K artifacts.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR, env = "RANKFORGE_OUTPUT_DIR")]
    pub output: PathBuf,

    /// Seed for sales synthesis, splitting and bootstrap sampling.
    #[arg(long, default_value_t = 42, env = "RANKFORGE_SEED")]
    pub seed: u64,

    /// Number of trees in the forest.
    #[arg(long, default_value_t = 100, env = "RANKFORGE_TREES")]
    pub trees: usize,

    /// Fraction of rows held out for the test split.
    #[arg(long, default_value_t = 0.2, env = "RANKFORGE_TEST_FRACTION")]
    pub test_fraction: f64,

    /// Print the run summary as JSON instead of log lines.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `rankforge compile`.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Pipeline name recorded in the manifest.
    #[arg(long, default_value = "product-scoring")]
    pub name: String,

    /// Output path for the compiled YAML manifest.
    #[arg(short = 'o', long, default_value = DEFAULT_MANIFEST)]
    pub output: PathBuf,

    /// Input CSV recorded as the manifest's default parameter.
    #[arg(short = 'i', long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output directory recorded as the manifest's default parameter.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Seed recorded as the manifest's default parameter.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before
/// running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_pipeline_command(args).await,
        Commands::Compile(args) => run_compile_command(args),
    }
}

async fn run_pipeline_command(args: RunArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::new()
        .with_input_path(args.input)
        .with_output_dir(args.output)
        .with_seed(args.seed)
        .with_n_trees(args.trees)
        .with_test_fraction(args.test_fraction);
    config.validate()?;

    let summary = PipelineRunner::new(config).run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    info!(
        rows = summary.rows_loaded,
        skipped = summary.rows_skipped,
        parser = %summary.parser,
        train_r2 = summary.train_r2,
        test_r2 = summary.test_r2,
        "Pipeline finished"
    );
    println!("Loaded {} products ({} skipped)", summary.rows_loaded, summary.rows_skipped);
    println!(
        "Model R² - train: {:.4}, test: {:.4}",
        summary.train_r2, summary.test_r2
    );
    println!("Model saved to {}", summary.model_path);
    println!(
        "Top {} products saved to {}",
        summary.top_rows, summary.top_products_path
    );
}

fn run_compile_command(args: CompileArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::new()
        .with_input_path(args.input)
        .with_output_dir(args.output_dir)
        .with_seed(args.seed);
    config.validate()?;

    let manifest = compile_standard_manifest(args.name, &config);
    manifest.compile_to_file(&args.output)?;

    println!("Pipeline manifest written to {}", args.output.display());
    Ok(())
}
