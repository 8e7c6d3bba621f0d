// src/analyze/select.rs
//! Selection: drop zero scores, stable sort by score (desc), keep the top `cap`.
//!
//! `Vec::sort_by` is stable, so equal scores keep collection order
//! (source-list order, then discovery order inside a source).

use crate::analyze::scoring::ScoredCandidate;
use crate::ingest::types::Candidate;

pub fn top_k(scored: Vec<ScoredCandidate>, cap: usize) -> Vec<ScoredCandidate> {
    let mut kept: Vec<ScoredCandidate> = scored.into_iter().filter(|s| s.score > 0).collect();
    kept.sort_by(|a, b| b.score.cmp(&a.score));
    kept.truncate(cap);
    kept
}

/// Strip scores for delivery.
pub fn into_candidates(selection: Vec<ScoredCandidate>) -> Vec<Candidate> {
    selection.into_iter().map(|s| s.candidate).collect()
}
