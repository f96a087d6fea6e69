use anyhow::{bail, Context, Result};
use burncloud_download_batch::submission::{self, count_urls};
use burncloud_download_batch::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Submit batches to a download server and follow their progress
#[derive(Parser, Debug)]
#[command(name = "batch-dl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a batch of URLs
    Submit {
        /// URLs to download
        urls: Vec<String>,

        /// Read URLs from a file, one per line
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Output folder name on the server
        #[arg(long)]
        folder: Option<String>,

        /// Filename pattern, e.g. "%(title)s.%(ext)s"
        #[arg(long)]
        pattern: Option<String>,

        /// Create a zip archive of the folder
        #[arg(long)]
        auto_zip: bool,

        /// Skip invalid URLs instead of rejecting the batch
        #[arg(long)]
        skip_invalid: bool,

        /// Number of parallel downloads on the server
        #[arg(long, value_name = "N")]
        parallel: Option<u32>,

        /// Cookie file to upload (needed for Instagram and Facebook URLs)
        #[arg(long, value_name = "PATH")]
        cookies: Option<PathBuf>,

        /// Follow progress after the batch is accepted
        #[arg(long)]
        watch: bool,

        #[command(flatten)]
        polling: PollingArgs,
    },

    /// Follow progress of the current batch
    Watch {
        #[command(flatten)]
        polling: PollingArgs,
    },

    /// Ask the server to open a batch folder
    OpenFolder { folder: String },

    /// Print the archive URL of a batch folder
    ZipUrl { folder: String },

    /// Reset the server's batch status
    Clear,
}

#[derive(clap::Args, Debug, Default)]
struct PollingArgs {
    /// Poll every second and give up after five minutes
    #[arg(long)]
    bounded: bool,

    /// Poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Stop polling after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

impl PollingArgs {
    fn resolve(&self, base: &PollerConfig) -> PollerConfig {
        let mut config = if self.bounded {
            PollerConfig::bounded()
        } else {
            base.clone()
        };
        if let Some(ms) = self.interval_ms {
            config.interval_ms = ms;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("CLI arguments: {:?}", cli);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(server) = &cli.server {
        config.server.url = server.clone();
    }

    let client = Arc::new(BatchClient::with_timeout(
        &config.server.url,
        config.server.request_timeout(),
    )?);

    match cli.command {
        Commands::Submit {
            urls,
            file,
            folder,
            pattern,
            auto_zip,
            skip_invalid,
            parallel,
            cookies,
            watch,
            polling,
        } => {
            let mut lines = urls;
            if let Some(path) = file {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                lines.extend(content.lines().map(str::to_string));
            }

            let mut request = BatchRequest::from_urls(&lines);
            request.folder = folder;
            request.filename_pattern = pattern;
            request.auto_zip = auto_zip;
            request.skip_invalid = skip_invalid;
            request.parallel_downloads = parallel;
            request.cookie_file = cookies;

            println!("Submitting {} URL(s)...", count_urls(&request.urls));
            let response = submission::submit(&client, &request)
                .await
                .context("Error initiating download")?;
            println!("Batch started with {} task(s).", response.task_ids.len());

            if watch {
                watch_progress(client, polling.resolve(&config.poller)).await?;
            }
        }
        Commands::Watch { polling } => {
            watch_progress(client, polling.resolve(&config.poller)).await?;
        }
        Commands::OpenFolder { folder } => {
            client
                .open_folder(&folder)
                .await
                .with_context(|| format!("Failed to open folder {}", folder))?;
            println!("Attempting to open folder: {}", folder);
        }
        Commands::ZipUrl { folder } => {
            println!("{}", client.download_zip_url(&folder)?);
        }
        Commands::Clear => {
            client.clear_status().await?;
            println!("Server status cleared.");
        }
    }

    Ok(())
}

async fn watch_progress(client: Arc<BatchClient>, poller_config: PollerConfig) -> Result<()> {
    let timeout = poller_config.timeout();
    let poller = ProgressPoller::new(client, ConsoleView::stdout(), poller_config);
    let (handle, mut task) = poller.spawn();

    let outcome = tokio::select! {
        outcome = &mut task => outcome?,
        _ = tokio::signal::ctrl_c() => {
            handle.shutdown();
            task.await?
        }
    };

    match outcome {
        PollOutcome::TimedOut => {
            let limit = timeout.unwrap_or_default();
            bail!(BatchError::Timeout(limit))
        }
        PollOutcome::Idle | PollOutcome::Completed | PollOutcome::Cancelled => Ok(()),
    }
}
