// src/notify/mod.rs
pub mod slack;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::error::DeliveryError;
use crate::ingest::types::Candidate;

pub use slack::SlackNotifier;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_deliveries_total", "Messages delivered.");
        describe_counter!(
            "digest_delivery_failures_total",
            "Messages dropped after a failed delivery."
        );
        describe_counter!(
            "digest_dry_run_messages_total",
            "Messages only logged because no delivery endpoint is configured."
        );
    });
}

/// One outbound message channel. One call per message, no retries.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
    fn name(&self) -> &'static str;
    /// True when `send` only logs. Such messages are never counted as delivered.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Per-run delivery counts. `delivered` only counts messages that reached the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryTally {
    pub delivered: usize,
    pub logged_only: usize,
    pub failed: usize,
}

/// Slack mrkdwn control characters.
pub fn escape_mrkdwn(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Title, subreddit and link back to the post.
pub fn format_message(c: &Candidate) -> String {
    format!(
        "*{}*\nSubreddit: r/{}\n<{}|View on Reddit>",
        escape_mrkdwn(c.title.trim()),
        c.source_id,
        c.permalink
    )
}

/// Send every item independently. A failure never stops later items.
pub async fn deliver(notifier: &dyn Notifier, selection: &[Candidate]) -> DeliveryTally {
    ensure_metrics_described();

    let dry_run = notifier.is_dry_run();
    let mut tally = DeliveryTally::default();
    for (idx, c) in selection.iter().enumerate() {
        let text = format_message(c);
        match notifier.send(&text).await {
            Ok(()) if dry_run => {
                tally.logged_only += 1;
                counter!("digest_dry_run_messages_total").increment(1);
            }
            Ok(()) => {
                tally.delivered += 1;
                counter!("digest_deliveries_total").increment(1);
            }
            Err(e) => {
                tally.failed += 1;
                tracing::error!(
                    error = %e,
                    notifier = notifier.name(),
                    position = idx + 1,
                    permalink = %c.permalink,
                    "delivery failed; message dropped"
                );
                counter!("digest_delivery_failures_total").increment(1);
            }
        }
    }
    tracing::info!(
        delivered = tally.delivered,
        logged_only = tally.logged_only,
        failed = tally.failed,
        total = selection.len(),
        "delivery finished"
    );
    tally
}
