// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One post as returned by a source, before keyword filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawPost {
    pub title: String,
    pub body: String,
    pub external_url: Option<String>,
    pub permalink: String, // absolute
}

/// A post that matched at least one keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub source_id: String,
    pub external_url: Option<String>,
    pub permalink: String,
    /// lowercase(title + " " + body)
    pub combined_text: String,
}

impl Candidate {
    pub fn from_raw(source_id: &str, post: RawPost) -> Self {
        let combined_text = combined_text(&post.title, &post.body);
        Self {
            title: post.title,
            source_id: source_id.to_string(),
            external_url: post.external_url,
            permalink: post.permalink,
            combined_text,
        }
    }
}

pub fn combined_text(title: &str, body: &str) -> String {
    format!("{title} {body}").to_lowercase()
}

/// Read access to one kind of content source.
///
/// Implementations return `FetchError::Unavailable` for anything a later run
/// could plausibly succeed at, and `FetchError::Unauthorized` only when the
/// credentials themselves are refused.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch_recent(&self, source_id: &str, limit: usize)
        -> Result<Vec<RawPost>, FetchError>;
    fn name(&self) -> &'static str;
}
