use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trendboard_core::{
    config::{Config, LogFormat},
    GitHubFetcher, ReportFormat, Shutdown, TrendPeriod, Workflow,
};
use trendboard_store::JsonStore;

#[derive(Parser)]
#[command(name = "trendboard")]
#[command(
    version,
    about = "Track GitHub star trends and publish a ranked dashboard",
    long_about = None
)]
struct Cli {
    /// Config file (default: <config dir>/trendboard/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `trendboard_core=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Write the default target list (and a starter config if --config points nowhere)
    Init,
    /// Fetch star counts for every target and save today's snapshot
    Update {
        /// Cap on concurrent GitHub requests
        #[arg(short = 'j', long)]
        max_parallel: Option<usize>,
    },
    /// Compare snapshots and write the trend dashboard
    Generate {
        /// daily, weekly or monthly
        #[arg(short, long)]
        period: Option<TrendPeriod>,

        /// md or html (default: guessed from --output, then config)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat this day as today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let starter_config = match (&cli.command, &cli.config) {
        (Commands::Init, Some(path)) if !path.exists() => {
            Config::default()
                .save(path)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            Some(path.clone())
        }
        _ => None,
    };

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config);

    if let Some(path) = starter_config {
        tracing::info!(path = %path.display(), "Wrote starter config");
    }

    match cli.command {
        Commands::Init => init(config),
        Commands::Update { max_parallel } => {
            if let Some(n) = max_parallel {
                config.update.max_parallel = n;
            }
            config.validate()?;
            update(config).await
        }
        Commands::Generate {
            period,
            format,
            output,
            date,
        } => {
            if let Some(period) = period {
                config.report.period = period;
            }
            let guessed = output.as_deref().and_then(format_from_path);
            if let Some(format) = format.or(guessed) {
                config.report.format = format;
            }
            if let Some(output) = output {
                config.report.output_path = output;
            }
            generate(config, date.unwrap_or_else(|| Utc::now().date_naive()))
        }
    }
}

// Logs go to stderr so stdout stays clean for the summary
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.logging.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn store_for(config: &Config) -> JsonStore {
    JsonStore::new(&config.storage.repos_file, &config.storage.data_dir)
}

fn format_from_path(path: &Path) -> Option<ReportFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ReportFormat::from_extension)
}

fn init(config: Config) -> anyhow::Result<()> {
    let store = store_for(&config);
    let path = store.targets_path().to_path_buf();

    if Workflow::new(config, store).initialize()? {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, nothing to do", path.display());
    }
    Ok(())
}

async fn update(config: Config) -> anyhow::Result<()> {
    if config.github.token.is_none() {
        tracing::warn!(
            "No GitHub token configured, unauthenticated requests are heavily rate limited"
        );
    }

    let fetcher = Arc::new(GitHubFetcher::new(&config.github)?);
    let today = Utc::now().date_naive();

    // Ctrl-C stops dispatching and abandons in-flight fetches
    let (trigger, shutdown) = Shutdown::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling update");
            trigger.trigger();
        }
    });

    let workflow = Workflow::new(config.clone(), store_for(&config));
    let report = workflow
        .update(fetcher, &shutdown, today)
        .await
        .context("Update failed")?;

    if report.cancelled {
        bail!(
            "Update cancelled: {} fetched, {} failed, {} never dispatched; nothing saved",
            report.repositories.len(),
            report.failures.len(),
            report.not_dispatched
        );
    }

    println!(
        "Updated {}/{} repositories for {}",
        report.repositories.len(),
        report.attempted(),
        today
    );
    for failure in &report.failures {
        println!("  failed [{}] {}", failure.kind(), failure);
    }
    if report.repositories.is_empty() {
        println!("No repository data was fetched, snapshot not saved");
    }
    Ok(())
}

fn generate(config: Config, today: NaiveDate) -> anyhow::Result<()> {
    let workflow = Workflow::new(config.clone(), store_for(&config));

    let trends = match workflow.generate(today, Utc::now()) {
        Ok(trends) => trends,
        Err(e) if e.is_not_found() => {
            bail!("No snapshot for {}, run `trendboard update` first ({})", today, e)
        }
        Err(e) => return Err(e).context("Failed to generate dashboard"),
    };

    for (i, trend) in trends.iter().enumerate() {
        tracing::info!(
            rank = i + 1,
            repo = trend.repository().full_name(),
            stars = trend.repository().stars(),
            diff = trend.diff(),
            "Trend"
        );
    }

    println!(
        "Wrote {} ({} repositories, {})",
        config.report.output_path.display(),
        trends.len(),
        config.report.period
    );
    Ok(())
}
