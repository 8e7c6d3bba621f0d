// src/config/credentials.rs
use std::fmt;

use crate::error::DigestError;

pub const ENV_REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct Credentials {
    pub reddit: RedditCredentials,
    pub openai_api_key: String,
    /// No webhook means log-only delivery.
    pub slack_webhook_url: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self, DigestError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Resolve credentials through an arbitrary lookup (env, tests, a secrets map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DigestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, DigestError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(DigestError::MissingCredential(key))
        };

        Ok(Self {
            reddit: RedditCredentials {
                client_id: required(ENV_REDDIT_CLIENT_ID)?,
                client_secret: required(ENV_REDDIT_CLIENT_SECRET)?,
                user_agent: required(ENV_REDDIT_USER_AGENT)?,
            },
            openai_api_key: required(ENV_OPENAI_API_KEY)?,
            slack_webhook_url: lookup(ENV_SLACK_WEBHOOK_URL)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

// Secrets never show up in logs: only presence and length.
impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id_len", &self.client_id.len())
            .field("client_secret_len", &self.client_secret.len())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("reddit", &self.reddit)
            .field("openai_key_len", &self.openai_api_key.len())
            .field("slack_webhook", &self.slack_webhook_url.is_some())
            .finish()
    }
}
