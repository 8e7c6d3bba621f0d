// src/ingest/providers/reddit.rs
//! Reddit listing provider (application-only OAuth).
//!
//! `connect` exchanges the client id/secret for a bearer token once per run.
//! A refused token request is fatal; everything that goes wrong while reading
//! an individual subreddit is reported as `FetchError::Unavailable`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::credentials::RedditCredentials;
use crate::config::digest::{Listing, RedditSettings};
use crate::error::{DigestError, FetchError};
use crate::ingest::types::{RawPost, SourceClient};

/// Reddit serves at most 100 items per listing page.
pub const MAX_PAGE_SIZE: usize = 100;

const PERMALINK_BASE: &str = "https://reddit.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    // string ("invalid_grant") or numeric (401) depending on the failure
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    permalink: String,
}

pub struct RedditClient {
    http: reqwest::Client,
    api_base: String,
    listing: Listing,
    token: String,
}

impl RedditClient {
    /// Authenticate and return a ready client. Errors here are fatal for the run.
    pub async fn connect(
        creds: &RedditCredentials,
        settings: &RedditSettings,
        timeout: Duration,
    ) -> Result<Self, DigestError> {
        let http = reqwest::Client::builder()
            .user_agent(creds.user_agent.clone())
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .map_err(|e| DigestError::Config(format!("building reddit http client: {e}")))?;

        let resp = http
            .post(&settings.auth_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| DigestError::AuthUnavailable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DigestError::InvalidCredentials(format!(
                "token endpoint returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(DigestError::AuthUnavailable(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| DigestError::AuthUnavailable(format!("parsing token response: {e}")))?;
        let token = match (body.access_token, body.error) {
            (Some(t), _) if !t.is_empty() => t,
            (_, Some(err)) => {
                let msg = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
                return Err(DigestError::InvalidCredentials(msg));
            }
            _ => {
                return Err(DigestError::InvalidCredentials(
                    "token response without access_token".into(),
                ))
            }
        };

        tracing::info!(listing = settings.listing.as_str(), "reddit client authenticated");
        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            listing: settings.listing,
            token,
        })
    }

    fn listing_url(&self, source_id: &str) -> String {
        format!(
            "{}/r/{}/{}",
            self.api_base,
            source_id,
            self.listing.as_str()
        )
    }
}

/// Reddit permalinks are site-relative; make them absolute.
pub fn absolute_permalink(permalink: &str) -> Option<String> {
    let p = permalink.trim();
    if p.starts_with("https://") || p.starts_with("http://") {
        Some(p.to_string())
    } else if p.starts_with('/') {
        Some(format!("{PERMALINK_BASE}{p}"))
    } else {
        None
    }
}

fn into_raw_post(data: PostData) -> Option<RawPost> {
    let permalink = absolute_permalink(&data.permalink)?;
    let external_url = data.url.filter(|u| !u.trim().is_empty());
    Some(RawPost {
        title: data.title,
        body: data.selftext,
        external_url,
        permalink,
    })
}

#[async_trait]
impl SourceClient for RedditClient {
    async fn fetch_recent(
        &self,
        source_id: &str,
        limit: usize,
    ) -> Result<Vec<RawPost>, FetchError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let limit_param = limit.to_string();
        let resp = self
            .http
            .get(self.listing_url(source_id))
            .bearer_auth(&self.token)
            .query(&[("limit", limit_param.as_str()), ("raw_json", "1")])
            .send()
            .await
            .map_err(|e| FetchError::unavailable(source_id, e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized(format!(
                "listing for {source_id} returned {status}"
            )));
        }
        if !status.is_success() {
            // 403 private/quarantined, 404 banned, 429 rate limited, 5xx outages
            return Err(FetchError::unavailable(source_id, format!("status {status}")));
        }

        let listing: ListingResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::unavailable(source_id, format!("parsing listing: {e}")))?;

        let posts: Vec<RawPost> = listing
            .data
            .children
            .into_iter()
            .filter_map(|t| into_raw_post(t.data))
            .take(limit)
            .collect();
        tracing::debug!(source = source_id, posts = posts.len(), "listing fetched");
        Ok(posts)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
