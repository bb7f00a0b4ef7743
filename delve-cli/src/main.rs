//! Delve CLI - Command-line interface for Delve
//!
//! Runs a research query end to end and prints the categorized report

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use delve_core::{
    init_logging, log_operation_error, DelveConfig, ResearchReport, ResearchRequest,
};
use delve_research::ResearchPipeline;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "delve")]
#[command(about = "Fact-grounded research reports from web and social sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a query and print the categorized summary
    Research {
        /// Free-text query, or user_id:post_id pairs separated by commas
        query: String,

        /// Start of the date range (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// End of the date range (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,

        /// Maximum number of URLs to fetch
        #[arg(long)]
        max_sources: Option<usize>,

        /// Generate a draft answer before summarizing sources
        #[arg(long)]
        draft: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // `config --init` must work before any file exists, so loading errors surface per command
    let loaded = DelveConfig::load(cli.config.as_deref());

    let logging_config = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    let logging_config = if cli.verbose {
        logging_config.verbose()
    } else {
        logging_config
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Delve CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Research {
            query,
            start_date,
            end_date,
            max_sources,
            draft,
            json,
        } => {
            let mut config = loaded.context("Failed to load configuration")?;
            if draft {
                config.pipeline.draft_first = true;
            }
            let request = ResearchRequest::new(query)
                .with_dates(start_date, end_date)
                .with_max_sources(max_sources.unwrap_or(config.pipeline.max_sources));

            handle_research(&config, &request, json).await?;
        }
        Commands::Config {
            init,
            show,
            validate,
        } => {
            handle_config(cli.config.as_deref(), init, show, validate)?;
        }
    }

    Ok(())
}

async fn handle_research(config: &DelveConfig, request: &ResearchRequest, json: bool) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let pipeline = ResearchPipeline::from_config(config)?;
    info!(backend = %pipeline.engine().backend().describe(), "Pipeline ready");

    let report = match pipeline.run(request).await {
        Ok(report) => report,
        Err(e) => {
            log_operation_error!("research", e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ResearchReport) {
    println!("\n================ FINAL CATEGORIZED SUMMARY ================\n");
    if report.final_summary.is_empty() {
        println!("No source produced usable text for \"{}\".", report.query);
    } else {
        println!("{}", report.final_summary);
    }
    println!(
        "\n{} section(s) from {} candidate URL(s)",
        report.sources_processed, report.urls_scraped
    );
}

fn handle_config(path: Option<&Path>, init: bool, show: bool, validate: bool) -> Result<()> {
    if init {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => DelveConfig::default_path()
                .context("Could not determine home directory; pass --config")?,
        };

        DelveConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {:?}", config_path);
        println!("📝 Set generation.llama_cli_path and generation.model_path before running research.");
    }

    if !show && !validate {
        return Ok(());
    }
    let config = DelveConfig::load(path).context("Failed to load configuration")?;

    if show {
        println!("📋 Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
