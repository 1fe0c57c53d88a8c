use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use arxiv_export::apis::arxiv::ArxivClient;
use arxiv_export::config::Config;
use arxiv_export::export::{self, MAX_RESULTS_CAP};
use arxiv_export::prompt::Prompter;
use arxiv_export::query::{self, SearchMode};
use arxiv_export::render::Format;

/// Export arXiv search results as RIS, BibTeX or EndNote citations.
///
/// Anything not given on the command line is asked for interactively.
#[derive(Parser, Debug)]
#[command(name = "arxiv-export")]
#[command(version, about)]
struct Cli {
    /// Which arXiv search page the URL comes from
    #[arg(short, long, value_enum)]
    mode: Option<SearchMode>,

    /// Search results URL copied from the browser
    #[arg(short, long)]
    url: Option<String>,

    /// Citation format to write
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Number of newest results to export (clamped to the hit count and 1000)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RESULTS_CAP)))]
    count: Option<u32>,

    /// Directory to write the export file into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Catalog endpoint (overrides ARXIV_EXPORT_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let stdin = io::stdin();
    let mut prompt = Prompter::new(stdin.lock(), io::stdout());

    let mode = match cli.mode {
        Some(mode) => mode,
        None => prompt.search_mode()?,
    };
    let url = match cli.url {
        Some(url) => url,
        None => prompt.search_url()?,
    };
    let output_dir = match cli.output_dir {
        Some(dir) => dir,
        None => prompt.output_dir(&config.output_dir)?,
    };

    let api_query = query::build_query(&url, mode)
        .context("could not read the search URL; check that it matches the chosen search type")?;
    prompt.say(format!("Search URL parsed: {api_query}"))?;

    let client = ArxivClient::new(&config).context("failed to create HTTP client")?;

    prompt.say("Counting matching papers...")?;
    let total = export::probe_total(&client, &api_query).await;
    if total == 0 {
        bail!("the search returned no results; check the search query");
    }
    prompt.say(format!("Found {total} matching papers."))?;

    let format = match cli.format {
        Some(format) => format,
        None => prompt.format()?,
    };
    let count = match cli.count {
        Some(n) => export::clamp_count(n, total),
        None => prompt.count(total)?,
    };

    prompt.say(format!(
        "Fetching the newest {count} papers as {}...",
        format.display_name()
    ))?;
    let summary = export::run_export(&client, &api_query, count, format, &output_dir)
        .await
        .context("export failed")?;

    prompt.say(format!(
        "Exported {} {} records to {}",
        summary.records,
        summary.format.display_name(),
        summary.path.display()
    ))?;
    Ok(())
}
