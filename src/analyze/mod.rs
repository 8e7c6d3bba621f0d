// src/analyze/mod.rs
//! Relevance stage: oracle adapter, scoring, and selection.

pub mod ai_adapter;
pub mod scoring;
pub mod select;

pub use crate::analyze::scoring::{RelevanceScorer, ScoredCandidate};
pub use crate::analyze::select::top_k;
