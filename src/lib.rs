// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::analyze::ai_adapter::{DynOracle, OpenAiOracle, Oracle};
pub use crate::analyze::scoring::{RelevanceScorer, ScoredCandidate};
pub use crate::config::{Credentials, DigestConfig};
pub use crate::error::{DeliveryError, DigestError, FetchError, ScoreError};
pub use crate::ingest::providers::reddit::RedditClient;
pub use crate::ingest::types::{Candidate, RawPost, SourceClient};
pub use crate::notify::{Notifier, SlackNotifier};
pub use crate::pipeline::{Outcome, Pipeline, RunReport};
