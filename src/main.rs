//! Subreddit digest: binary entrypoint
//! Resolves config + credentials, runs one digest pass, exits.
//!
//! Exit code is non-zero only for fatal setup errors (missing/rejected
//! credentials, invalid config). Per-source, per-item failures only log.

use std::sync::Arc;

use anyhow::Context;
use subreddit_digest::{
    metrics::Metrics, notify::Notifier, Credentials, DigestConfig, OpenAiOracle, Pipeline,
    RedditClient, RelevanceScorer, SlackNotifier,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins; otherwise info for this crate, warn for dependencies.
/// `DIGEST_LOG_JSON=1` switches to one JSON object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subreddit_digest=info,warn"));

    let json = std::env::var("DIGEST_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DigestConfig::load_default().context("loading digest config")?;
    cfg.validate()?;
    let creds = Credentials::from_env()?;
    tracing::debug!(?creds, "credentials resolved");

    let metrics = match &cfg.metrics_path {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    let timeout = cfg.http_timeout();
    let reddit = RedditClient::connect(&creds.reddit, &cfg.reddit, timeout).await?;
    let oracle = OpenAiOracle::new(creds.openai_api_key.clone(), &cfg.oracle, timeout)
        .context("building oracle client")?;
    let scorer = RelevanceScorer::new(Arc::new(oracle), cfg.brand.clone(), cfg.max_scale);
    let notifier = SlackNotifier::new(creds.slack_webhook_url.clone()).with_timeout(timeout);
    if notifier.is_dry_run() {
        tracing::warn!("SLACK_WEBHOOK_URL not set; selections will only be logged");
    }

    let metrics_path = cfg.metrics_path.clone();
    let pipeline = Pipeline::new(cfg, Arc::new(reddit), scorer, Arc::new(notifier));
    let report = pipeline.run().await?;

    match serde_json::to_string(&report) {
        Ok(json) => tracing::info!(report = %json, "run report"),
        Err(e) => tracing::warn!(error = %e, "could not serialize run report"),
    }

    if let (Some(m), Some(path)) = (metrics, metrics_path) {
        // Metrics are best-effort; a failed write does not fail the run.
        if let Err(e) = m.write_textfile(&path) {
            tracing::warn!(error = ?e, "metrics textfile not written");
        }
    }

    Ok(())
}
