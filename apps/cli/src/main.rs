//! `mediafire-dl`: download every file of a public MediaFire folder
//!
//! Exit codes: 0 when every file downloaded, 1 when at least one file
//! failed, 2 when the run could not start (bad URL, missing folder,
//! unreachable API, bad configuration).

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, Level};

use mediafire::{
    BatchSummary, ConsoleProgressReporter, DownloadConfig, DownloadError, FolderDownloader,
    IntoProgressCallback, LinkFallback, NullProgressReporter,
};

/// Download a public MediaFire folder
#[derive(Parser, Debug)]
#[command(name = "mediafire-dl")]
#[command(about = "Download every file of a public MediaFire folder")]
#[command(version)]
struct Cli {
    /// Folder URL (`.../folder/<key>/...` or `...#<key>`)
    folder_url: String,

    /// Directory the folder is created under
    #[arg(short = 'o', long = "output", default_value = ".")]
    output: PathBuf,

    /// Files downloaded at the same time
    #[arg(short = 'j', long = "concurrency", value_parser = clap::value_parser!(u8).range(1..=5))]
    concurrency: Option<u8>,

    /// What to do when a landing page has no download anchor (never, unparsable, always)
    #[arg(long = "fallback")]
    fallback: Option<LinkFallback>,

    /// Extra attempts for transient failures
    #[arg(long = "retries")]
    retries: Option<usize>,

    /// Request timeout, and stall timeout for transfers, in seconds
    #[arg(long = "timeout")]
    timeout: Option<u64>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    verbose: bool,

    /// Only print the final summary
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

impl Cli {
    /// Environment defaults with command-line overrides applied
    fn config(&self) -> anyhow::Result<DownloadConfig> {
        let mut config = DownloadConfig::from_env().context("reading MEDIAFIRE_* environment")?;
        if let Some(concurrency) = self.concurrency {
            config.concurrency = usize::from(concurrency);
        }
        if let Some(fallback) = self.fallback {
            config.link_fallback = fallback;
        }
        if let Some(retries) = self.retries {
            config.max_retries = retries;
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::INFO
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(summary) => {
            print_summary(&summary);
            if summary.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let suggestion = err.downcast_ref::<DownloadError>().and_then(|e| e.suggestion());
            if let Some(suggestion) = suggestion {
                eprintln!("Hint: {}", suggestion);
            }
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<BatchSummary> {
    let config = cli.config()?;
    debug!(?config, "Effective configuration");

    let downloader = FolderDownloader::new(config)?;
    let progress = if cli.quiet {
        NullProgressReporter.into_callback()
    } else {
        ConsoleProgressReporter::new(cli.verbose).into_callback()
    };

    let report = downloader
        .download_folder(&cli.folder_url, &cli.output, Some(progress))
        .await?;

    println!(
        "Folder '{}' saved to {}",
        report.listing.name,
        report.destination.display()
    );
    Ok(report.summary())
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "{}/{} files downloaded ({} bytes)",
        summary.succeeded, summary.total, summary.total_bytes
    );
    for failure in &summary.failures {
        match &failure.detail {
            Some(detail) => {
                println!("  FAILED {} [{}]: {}", failure.filename, failure.status, detail)
            }
            None => println!("  FAILED {} [{}]", failure.filename, failure.status),
        }
    }
}
