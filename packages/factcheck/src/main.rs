//! Fact-checking CLI
//!
//! `analyze` runs claim extraction and verification over a scraped dataset;
//! `check` scores previously extracted claim lists in one stage.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use factcheck::config::{FACT_CHECK_FILE, REPORTS_FILE};
use factcheck::{
    check_claims, load_claim_lists, load_dataset, logging, write_json, BatchedGenerator, Config,
    Pipeline, ProviderClients, TemplateStore,
};

#[derive(Parser)]
#[command(name = "factcheck")]
#[command(about = "Extract and verify factual claims in social media posts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract claims from every post and verify them
    Analyze {
        /// Claim extraction template in the prompt directory
        #[arg(short = 'p', long)]
        prompt_filename: String,

        /// Output file name inside the output directory
        #[arg(long, default_value = REPORTS_FILE)]
        output_filename: String,

        /// Dataset path (defaults to DATA_DIR/DATASET_FILE)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Score claim lists with a single search-grounded prompt per claim
    Check {
        /// Claim lists or an `analyze` report (defaults to the report in OUTPUT_DIR)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Results path inside OUTPUT_DIR by default
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    if let Some(path) = logging::init(&config.logging).context("Failed to initialize logging")? {
        tracing::info!(path = %path.display(), "Logging to file");
    }

    match cli.command {
        Commands::Analyze {
            prompt_filename,
            output_filename,
            dataset,
        } => analyze(&config, &prompt_filename, &output_filename, dataset).await,
        Commands::Check { input, output } => {
            let input = input.unwrap_or_else(|| config.output_path(REPORTS_FILE));
            let output = output.unwrap_or_else(|| config.output_path(FACT_CHECK_FILE));
            check(&config, input, output).await
        }
    }
}

async fn analyze(
    config: &Config,
    prompt_filename: &str,
    output_filename: &str,
    dataset: Option<PathBuf>,
) -> Result<()> {
    let templates = TemplateStore::new(&config.prompt_dir);
    let extraction_template = templates
        .load(prompt_filename)
        .context("Failed to load extraction template")?;
    let verification_template = templates
        .load(&config.verify_template)
        .context("Failed to load verification template")?;

    let dataset_path = dataset.unwrap_or_else(|| config.dataset_path());
    let dataset = load_dataset(&dataset_path)
        .with_context(|| format!("Failed to load dataset {}", dataset_path.display()))?;

    let client = ProviderClients::from_credentials(&config.credentials);
    let output_path = config.output_path(output_filename);
    Pipeline::new(client, config)
        .run_to_file(
            &dataset.tweets,
            &extraction_template,
            &verification_template,
            &output_path,
        )
        .await
        .context("Fact-check run failed")?;

    println!("Results saved to {}", output_path.display());
    Ok(())
}

async fn check(config: &Config, input: PathBuf, output: PathBuf) -> Result<()> {
    let claim_lists = load_claim_lists(&input)
        .with_context(|| format!("Failed to load claims from {}", input.display()))?;

    let generator = BatchedGenerator::new(ProviderClients::from_credentials(&config.credentials))
        .with_max_concurrent_batches(config.max_concurrent_batches)
        .with_retry_backoff(config.retry_backoff);
    let results = check_claims(&generator, &config.check_stage(), &claim_lists)
        .await
        .context("Fact check failed")?;

    write_json(&output, &results).context("Failed to write results")?;

    println!("Factuality check complete. Results saved to {}", output.display());
    Ok(())
}
