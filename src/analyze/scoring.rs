//! Relevance scoring against the oracle.
//!
//! Every candidate gets exactly one oracle call. Whatever goes wrong (transport,
//! status, garbage reply) ends as score 0, which the selector treats as
//! "not relevant". `try_score` keeps the error for callers that want it.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

use crate::analyze::ai_adapter::{sanitize_reply, DynOracle};
use crate::analyze::select;
use crate::error::ScoreError;
use crate::ingest::types::Candidate;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_oracle_calls_total", "Oracle requests sent.");
        describe_counter!(
            "digest_score_failures_total",
            "Candidates scored 0 because the oracle call or parse failed."
        );
        describe_histogram!("digest_oracle_ms", "Oracle round-trip time in milliseconds.");
    });
}

/// A candidate with its oracle score (0 = failed or not relevant).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: u32,
}

/// Rubric prompt. Fixed wording; only brand, scale and post fields vary.
pub fn build_prompt(brand: &str, brand_name: &str, max_scale: u32, c: &Candidate) -> String {
    format!(
        "You are a social media manager for {brand}. \
         Rate this Reddit post's relevance to {brand_name} on a scale from 1 (not relevant) \
         to {max_scale} (highly relevant). Only respond with a number.\n\n\
         Title: {title}\n\
         Body: {body}",
        title = c.title,
        body = c.combined_text,
    )
}

/// Every ASCII digit in the reply, joined and read as one integer, clamped to `max_scale`.
///
/// "8/10" reads as 810 and clamps to the top of the scale. Values too large
/// for `u32` saturate instead of failing.
pub fn parse_score(reply: &str, max_scale: u32) -> Result<u32, ScoreError> {
    static RE_DIGIT: OnceCell<Regex> = OnceCell::new();
    let re = RE_DIGIT.get_or_init(|| Regex::new(r"(?-u)\d").expect("static regex"));

    let mut digits = re.find_iter(reply).peekable();
    if digits.peek().is_none() {
        return Err(ScoreError::NoDigits(sanitize_reply(reply)));
    }
    let value = digits
        .flat_map(|m| m.as_str().bytes())
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        });
    Ok(value.min(max_scale))
}

pub struct RelevanceScorer {
    oracle: DynOracle,
    brand: String,
    brand_name: String,
    max_scale: u32,
}

impl RelevanceScorer {
    pub fn new(oracle: DynOracle, brand: impl Into<String>, max_scale: u32) -> Self {
        let brand = brand.into();
        let brand_name = brand.split(',').next().unwrap_or(&brand).trim().to_string();
        Self {
            oracle,
            brand,
            brand_name,
            max_scale,
        }
    }

    /// Score with the failure kept visible.
    pub async fn try_score(&self, candidate: &Candidate) -> Result<u32, ScoreError> {
        ensure_metrics_described();
        let prompt = build_prompt(&self.brand, &self.brand_name, self.max_scale, candidate);

        let t0 = std::time::Instant::now();
        counter!("digest_oracle_calls_total").increment(1);
        let reply = self.oracle.complete(&prompt).await;
        histogram!("digest_oracle_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        parse_score(&reply?, self.max_scale)
    }

    /// Total scoring: never fails, 0 on any error.
    pub async fn score(&self, candidate: &Candidate) -> u32 {
        match self.try_score(candidate).await {
            Ok(score) => {
                tracing::debug!(
                    source = %candidate.source_id,
                    permalink = %candidate.permalink,
                    score,
                    "candidate scored"
                );
                score
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.oracle.provider_name(),
                    permalink = %candidate.permalink,
                    "scoring failed; using 0"
                );
                counter!("digest_score_failures_total").increment(1);
                0
            }
        }
    }

    /// Score every candidate sequentially, keeping input order.
    pub async fn score_each(&self, candidates: Vec<Candidate>) -> Vec<ScoredCandidate> {
        let mut out = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let score = self.score(&candidate).await;
            out.push(ScoredCandidate { candidate, score });
        }
        out
    }

    /// Score everything, then rank and cap. Zero scores never make the cut.
    pub async fn score_all(&self, candidates: Vec<Candidate>, cap: usize) -> Vec<ScoredCandidate> {
        let scored = self.score_each(candidates).await;
        select::top_k(scored, cap)
    }
}
