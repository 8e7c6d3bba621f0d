//! AI adapter: the scoring oracle seam plus the OpenAI-compatible provider.
//!
//! The oracle contract is "best-effort single-shot text generation": one
//! prompt in, freeform text out, no retries. Interpreting the text is the
//! scorer's job.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::digest::OracleSettings;
use crate::error::ScoreError;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Trait object used by the scorer (and stubbed in tests).
#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    /// Send `prompt` once and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, ScoreError>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynOracle = Arc<dyn Oracle>;

// ------------------------------------------------------------
// OpenAI provider
// ------------------------------------------------------------

/// OpenAI chat-completions provider. Any endpoint speaking the same wire format works.
pub struct OpenAiOracle {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiOracle {
    pub fn new(
        api_key: impl Into<String>,
        settings: &OracleSettings,
        timeout: Duration,
    ) -> Result<Self, ScoreError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("subreddit-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

#[async_trait::async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, prompt: &str) -> Result<String, ScoreError> {
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScoreError::Status {
                status: status.as_u16(),
                body: sanitize_reply(&body),
            });
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ScoreError::Malformed(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ScoreError::Malformed("response has no choices".into()))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Sanitization
// ------------------------------------------------------------

/// Single line, ASCII only, <=160 chars. Used for log fields.
pub fn sanitize_reply(input: &str) -> String {
    let mut out = String::with_capacity(160);
    let mut prev_space = false;
    for ch in input.chars() {
        let c = match ch {
            '\r' | '\n' | '\t' => ' ',
            c if c.is_ascii() => c,
            _ => ' ',
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
        if out.len() >= 160 {
            break;
        }
    }
    out.trim().to_string()
}
