use std::time::Duration;

use reqwest::Client;

use super::Notifier;
use crate::error::DeliveryError;

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    /// `None` puts the notifier in log-only mode (dry run).
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let Some(url) = &self.webhook_url else {
            tracing::info!(message = text, "Slack disabled (no SLACK_WEBHOOK_URL); logged only");
            return Ok(());
        };

        let body = serde_json::json!({ "text": text });
        let rsp = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }

    fn is_dry_run(&self) -> bool {
        self.webhook_url.is_none()
    }
}
