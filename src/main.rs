//! # Dossier CLI Application
//!
//! Command-line interface for the dossier profile-enrichment pipeline.
//!
//! ## Subcommands
//!
//! - `run`: enrich one person from a grounding URL and save the profile
//! - `show`: print a previously saved profile
//!
//! API keys come from the environment: `GEMINI_API_KEY` for synthesis and
//! `BRAVE_SEARCH_API_KEY` for web search. Log verbosity follows
//! `RUST_LOG` (for example `RUST_LOG=dossier=debug`).

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dossier::pipeline::Pipeline;
use dossier::scrape::Scraper;
use dossier::search::{SearchClient, SearchConfig};
use dossier::store::FileStore;
use dossier::synthesis::{SynthesisConfig, Synthesizer, DEFAULT_MODEL};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds enriched schema.org Person profiles from public web sources", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich a person from a grounding profile URL
    Run(RunArgs),

    /// Print a saved profile
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Grounding profile URL (IMDb, Wikipedia, LinkedIn or any bio page)
    #[arg(required = true)]
    url: String,

    /// Industry context, e.g. "film"
    #[arg(required = true)]
    industry: String,

    /// Gemini model to use
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Directory for saved profiles
    #[arg(short, long, default_value = dossier::store::DEFAULT_ROOT)]
    output_dir: PathBuf,

    /// Maximum secondary search results to consider (1-20)
    #[arg(long, default_value = "20")]
    max_results: u8,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Run id of the saved profile
    #[arg(required = true)]
    id: String,

    /// Directory profiles were saved to
    #[arg(short, long, default_value = dossier::store::DEFAULT_ROOT)]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            run_command(args).await?;
        }
        Commands::Show(args) => {
            show_command(args).await?;
        }
    }

    Ok(())
}

#[instrument(skip(args))]
async fn run_command(args: RunArgs) -> anyhow::Result<()> {
    let gemini_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY environment variable must be set")?;
    let brave_key = std::env::var("BRAVE_SEARCH_API_KEY")
        .context("BRAVE_SEARCH_API_KEY environment variable must be set")?;

    let mut search_config = SearchConfig::new(brave_key);
    search_config.max_results = args.max_results;

    let pipeline = Pipeline::new(
        Arc::new(Scraper::new()?),
        Arc::new(SearchClient::new(search_config)?),
        Arc::new(Synthesizer::new(
            SynthesisConfig::new(gemini_key).with_model(&args.model),
        )?),
        Arc::new(FileStore::with_root(args.output_dir)),
    );

    println!("Enriching profile from {}...", args.url);
    let outcome = pipeline.run(&args.url, &args.industry).await?;

    println!(
        "Done. {} secondary sources found, {} scraped, {} local credits, {} local projects.",
        outcome.stats.secondary_sources_found,
        outcome.stats.secondary_sources_scraped,
        outcome.stats.local_credits,
        outcome.stats.local_projects,
    );
    println!("Run id: {}", outcome.run_id);
    println!("Saved to: {}", outcome.saved_to.display());

    Ok(())
}

#[instrument(skip(args))]
async fn show_command(args: ShowArgs) -> anyhow::Result<()> {
    let store = FileStore::with_root(args.output_dir);
    let profile = store.load(&args.id).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_invocation_shows_help() {
        let err = Cli::try_parse_from(["dossier"]).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }
}
