//! Candidate Shortlist Ranker: binary entrypoint
//! Loads config, runs every requested source and prints the shortlist.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use talent_ranker::{Pipeline, RankerConfig, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "talent-ranker", version, about = "Rank candidate profiles per source and hiring role")]
struct Cli {
    /// Config file (TOML or JSON); otherwise $RANKER_CONFIG_PATH or config/ranker.{toml,json}
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the source CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Source to analyse (github, kaggle, stackoverflow); repeatable, default all
    #[arg(long = "source", value_parser = parse_source)]
    sources: Vec<Source>,

    /// Candidates shown per role
    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Emit JSON log lines instead of compact text
    #[arg(long)]
    json_logs: bool,
}

fn parse_source(s: &str) -> Result<Source, String> {
    s.parse().map_err(|e: talent_ranker::PipelineError| e.to_string())
}

/// Logs go to stderr so stdout stays clean for the shortlist.
/// `RUST_LOG` overrides the default filter.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("talent_ranker=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut cfg = RankerConfig::resolve(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(k) = cli.top_k {
        cfg.top_k = k;
    }

    let pipeline = Arc::new(Pipeline::from_config(&cfg).context("invalid ranker configuration")?);
    let sources = if cli.sources.is_empty() {
        Source::ALL.to_vec()
    } else {
        cli.sources
    };

    tracing::info!(
        top_k = pipeline.top_k(),
        sources = ?sources,
        data_dir = %cfg.data_dir.display(),
        "starting run"
    );
    let shortlist = pipeline.run_all_concurrent(&sources).await;

    match cli.format {
        Format::Text => print!("{}", shortlist.render_text()),
        Format::Json => println!("{}", shortlist.to_json().context("serializing shortlist")?),
    }
    Ok(())
}
