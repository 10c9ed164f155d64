use anyhow::{Context, Result};
use deal_watch::config::{Config, LoggingConfig};
use deal_watch::feed::reddit::RedditFeed;
use deal_watch::filter::RuleSet;
use deal_watch::mail::SmtpMailer;
use deal_watch::render::DigestRenderer;
use deal_watch::run::{RunOutcome, Watcher};
use deal_watch::seen::SeenStore;
use deal_watch::WatchError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

struct Args {
    config: PathBuf,
    dry_run: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let dry_run = args.iter().any(|arg| arg == "--dry-run");
    let config = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    Args { config, dry_run }
}

/// RUST_LOG wins over the configured level.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deal_watch={}", config.level)));

    match &config.file {
        Some(path) => {
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(log_file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run(config: &Config, dry_run: bool) -> Result<RunOutcome> {
    let recipients = config.email_recipients()?;
    let password = if dry_run {
        Config::email_password().unwrap_or_default()
    } else {
        Config::email_password()?
    };

    let mut watcher = Watcher {
        subreddit: config.feed.subreddit.clone(),
        feed: RedditFeed::new(&config.feed)?,
        mailer: SmtpMailer::new(&config.mail, &recipients, password)?,
        store: SeenStore::new(config.sent_file()),
        rules: RuleSet::new(&config.feed.subreddit, &config.filter),
        renderer: DigestRenderer::from_config(&config.render)?,
        dry_run,
    };

    tracing::info!(
        subreddit = %config.feed.subreddit,
        sort = config.feed.sort.as_str(),
        limit = config.feed.limit,
        state = %watcher.store.path().display(),
        dry_run,
        "starting run"
    );

    Ok(watcher.run_once().await?)
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<WatchError>()
        .map(|e| e.exit_code() as u8)
        .unwrap_or(1)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = parse_args();

    // Load saved secrets from .env (real env vars take precedence)
    Config::load_env_file();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging(&LoggingConfig::default());
            tracing::error!("{:#}", e);
            return ExitCode::from(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("deal-watch: {:#}", e);
        return ExitCode::from(1);
    }

    match run(&config, args.dry_run).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code() as u8),
        Err(e) => {
            tracing::error!("run aborted: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
