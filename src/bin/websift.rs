//! CLI binary for websift.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use websift::{SearchPipeline, SiftConfig, SiftError};

/// Search the web and rank pages by relevance to a query.
#[derive(Parser)]
#[command(name = "websift", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the search pipeline and print ranked documents as JSON.
    Search {
        /// Natural-language query.
        query: String,
    },

    /// Fetch one page and print its extracted text.
    Fetch {
        /// Page URL.
        url: String,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("websift=info,websift_search=info,hf_hub=warn,ort=warn")
        }))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search { query } => run_search(cli.config, query).await,
        Command::Fetch { url } => run_fetch(cli.config, &url).await,
        Command::InitConfig { force } => init_config(cli.config, force),
    }
}

async fn run_search(config_path: Option<PathBuf>, query: String) -> anyhow::Result<()> {
    let config = SiftConfig::load(config_path.as_deref())?;

    // Model download and ONNX session creation block.
    let pipeline = tokio::task::spawn_blocking(move || SearchPipeline::from_config(&config))
        .await??;

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling search");
            cancel_clone.cancel();
        }
    });

    match pipeline.search_cancellable(&query, &cancel).await {
        Ok(results) => {
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Err(SiftError::Cancelled) => {
            eprintln!("search cancelled");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_fetch(config_path: Option<PathBuf>, url: &str) -> anyhow::Result<()> {
    let config = SiftConfig::load(config_path.as_deref())?;
    let fetcher = websift::Fetcher::new(config.fetch)?;
    let page = fetcher.fetch_page(url).await?;
    println!("# {}\n", page.title);
    println!("{}", page.text);
    eprintln!("{} words from {}", page.word_count, page.url);
    Ok(())
}

fn init_config(config_path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(SiftConfig::default_config_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    SiftConfig::default().save_to_file(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
