//! policylens is a CLI tool that finds a website's privacy policy and terms of
//! service, summarizes them with an LLM and rates the site with a privacy score.
//!
//! Results are cached per origin in a local database:
//! 1. `scan` - Locates, summarizes and scores the documents of the site of a page
//! 2. `summarize` - Re-summarizes a document from a manually supplied URL
//! 3. `show` - Displays cached results of a site
//! 4. `host` - Answers JSON messages on stdin/stdout for a browser extension

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};
use tokio::io::BufReader;
use url::Url;

use policylens::{
    DocumentKind, ExtractBy, Orchestrator, Summarizer,
    compose::export_summary,
    config::SummarizerConfig,
    constants::DEFAULT_MODEL,
    display::{render_scan, render_score, render_site},
    extract_text,
    fetch::{Fetcher, parse_origin},
    privacy_score, protocol,
    storage::Storage,
};

/// A CLI tool to summarize and score privacy policies and terms of service
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

/// Options of the summarization pipeline
#[derive(Args)]
struct PipelineArgs {
    /// URL of the LLM model to use, e.g. openai://gpt-4-turbo
    #[arg(long, short, default_value = DEFAULT_MODEL)]
    model: String,
    /// Base URL of an OpenAI compatible endpoint (optional)
    #[arg(long)]
    base_url: Option<String>,
    /// Text extraction method: "selectors" (default), "dom_smoothie" or "fast_html2md"
    #[arg(long, default_value = "selectors")]
    extract_by: ExtractBy,
}

#[derive(Subcommand)]
enum Command {
    /// Find, summarize and score the privacy policy and terms of service of a page's site
    Scan {
        /// Path to database file caching the results
        db: String,
        /// URL of a page of the site
        url: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Summarize a document from a manually supplied URL, replacing the cached result
    Summarize {
        /// Path to database file caching the results
        db: String,
        /// Site the document belongs to
        site: String,
        /// URL of the document to summarize
        url: String,
        /// Document kind: "privacy" (default) or "terms"
        #[arg(long, short, default_value = "privacy")]
        kind: DocumentKind,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Display cached summaries and privacy score of a site
    Show {
        /// Path to database file caching the results
        db: String,
        /// Site to display
        site: String,
    },
    /// Write a cached summary to a file
    Export {
        /// Path to database file caching the results
        db: String,
        /// Site the summary belongs to
        site: String,
        /// Path to output file
        output_file: String,
        /// Document kind: "privacy" (default) or "terms"
        #[arg(long, short, default_value = "privacy")]
        kind: DocumentKind,
    },
    /// Print the main content text of a page
    Extract {
        /// URL of the page
        url: String,
        /// Text extraction method: "selectors" (default), "dom_smoothie" or "fast_html2md"
        #[arg(long, default_value = "selectors")]
        extract_by: ExtractBy,
    },
    /// Compute the privacy score of a text file (or stdin)
    Score {
        /// Path to the text file, stdin if omitted
        file: Option<String>,
    },
    /// Show or record the user's consent for a site
    Consent {
        /// Path to database file caching the results
        db: String,
        /// Site the consent applies to
        site: String,
        /// Consent to record: true or false
        #[arg(long)]
        set: Option<bool>,
    },
    /// Answer line-delimited JSON messages on stdin with JSON responses on stdout
    Host {
        /// Path to database file caching the results
        db: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Scan { db, url, pipeline } => {
            let url = Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid page url: {}", e))?;
            let orchestrator = build_orchestrator(&db, &pipeline)?;
            let scan = orchestrator.scan_site(&url).await?;
            print!("{}", render_scan(&scan));
            Ok(())
        }
        Command::Summarize {
            db,
            site,
            url,
            kind,
            pipeline,
        } => handle_summarize_command(db, site, url, kind, pipeline).await,
        Command::Show { db, site } => {
            let origin = parse_origin(&site)?;
            let storage = Storage::new(&db)?;
            print!("{}", render_site(&origin, &storage.site_record(&origin)?));
            Ok(())
        }
        Command::Export {
            db,
            site,
            output_file,
            kind,
        } => {
            let origin = parse_origin(&site)?;
            export_summary(&Storage::new(&db)?, &origin, kind, &output_file)?;
            Ok(())
        }
        Command::Extract { url, extract_by } => {
            let url = Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid page url: {}", e))?;
            let html = Fetcher::new()?.fetch_text(&url).await?;
            println!("{}", extract_text(&html, extract_by));
            Ok(())
        }
        Command::Score { file } => handle_score_command(file),
        Command::Consent { db, site, set } => handle_consent_command(db, site, set),
        Command::Host { db, pipeline } => {
            let orchestrator = build_orchestrator(&db, &pipeline)?;
            info!("Serving messages on stdin");
            protocol::serve(
                &orchestrator,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await
            .context("Message host failed")
        }
    }
}

fn build_orchestrator(db: &str, pipeline: &PipelineArgs) -> Result<Orchestrator> {
    let config = SummarizerConfig::from_model_url(&pipeline.model)
        .context("Invalid model URL")?
        .with_api_key(SummarizerConfig::api_key_from_env())
        .with_base_url(pipeline.base_url.clone());

    Ok(Orchestrator::new(
        Storage::new(db).context(format!("Failed to open database: {db}"))?,
        Summarizer::from_config(&config)?,
        Fetcher::new()?,
    )
    .with_extract_by(pipeline.extract_by))
}

async fn handle_summarize_command(
    db: String,
    site: String,
    url: String,
    kind: DocumentKind,
    pipeline: PipelineArgs,
) -> Result<()> {
    let origin = parse_origin(&site).context(format!("Invalid site: {site}"))?;
    let url = Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid document url: {}", e))?;
    let orchestrator = build_orchestrator(&db, &pipeline)?;

    let analysis = orchestrator.override_url(&origin, kind, &url).await?;
    println!("{}\n", analysis.summary);
    print!("{}", render_score(analysis.score));
    Ok(())
}

fn handle_score_command(file: Option<String>) -> Result<()> {
    let text = match file {
        Some(file) => {
            fs::read_to_string(&file).context(format!("Failed to read text file: {file}"))?
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    print!("{}", render_score(Some(privacy_score(&text))));
    Ok(())
}

fn handle_consent_command(db: String, site: String, set: Option<bool>) -> Result<()> {
    let storage = Storage::new(&db)?;
    let site = parse_origin(&site).unwrap_or(site);

    if let Some(consent) = set {
        storage.save_user_consent(&site, consent)?;
        info!("Recorded consent {consent} for {site}");
    }

    match storage.user_consent(&site)? {
        Some(consent) => println!("{site}: {consent}"),
        None => println!("{site}: no consent recorded"),
    }
    Ok(())
}
