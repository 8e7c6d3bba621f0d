// src/pipeline.rs
//! One digest run: collect -> score -> select -> notify.
//!
//! Strictly linear. Nothing is retried; the only way out with an error is a
//! source that rejects the credentials.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::gauge;
use serde::Serialize;

use crate::analyze::scoring::RelevanceScorer;
use crate::analyze::select;
use crate::config::digest::DigestConfig;
use crate::error::DigestError;
use crate::ingest::{self, types::SourceClient};
use crate::notify::{self, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Idle,
    Collecting,
    Scoring,
    Selecting,
    Notifying,
    Done,
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    NoCandidates,
    NoSelections,
    Delivered,
    /// No delivery endpoint configured; the selection was only logged.
    LoggedOnly,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub sources_scanned: usize,
    pub failed_sources: Vec<String>,
    pub collected: usize,
    /// Candidates with a score above 0.
    pub relevant: usize,
    pub selected: usize,
    /// Messages accepted by the delivery endpoint.
    pub delivered: usize,
    /// Messages only logged (dry run).
    pub logged_only: usize,
    pub delivery_failures: usize,
    pub dry_run: bool,
    pub outcome: Outcome,
}

pub struct Pipeline {
    cfg: DigestConfig,
    source: Arc<dyn SourceClient>,
    scorer: RelevanceScorer,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        cfg: DigestConfig,
        source: Arc<dyn SourceClient>,
        scorer: RelevanceScorer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cfg,
            source,
            scorer,
            notifier,
        }
    }

    pub async fn run(&self) -> Result<RunReport, DigestError> {
        let mut stage = Stage::Idle;
        let started_at = Utc::now();
        let mut report = RunReport {
            started_at,
            sources_scanned: self.cfg.sources.len(),
            failed_sources: Vec::new(),
            collected: 0,
            relevant: 0,
            selected: 0,
            delivered: 0,
            logged_only: 0,
            delivery_failures: 0,
            dry_run: self.notifier.is_dry_run(),
            outcome: Outcome::NoCandidates,
        };
        tracing::info!(
            sources = self.cfg.sources.len(),
            keywords = self.cfg.keywords.len(),
            cap = self.cfg.max_daily,
            "digest run starting"
        );

        advance(&mut stage, Stage::Collecting);
        let collected = ingest::collect(
            self.source.as_ref(),
            self.cfg.sources.as_slice(),
            self.cfg.keywords.as_slice(),
            self.cfg.per_source_limit,
        )
        .await?;
        report.failed_sources = collected.failed_sources;
        report.collected = collected.candidates.len();

        if collected.candidates.is_empty() {
            tracing::info!("no keyword matches found");
            return Ok(self.finish(&mut stage, report, Outcome::NoCandidates));
        }

        advance(&mut stage, Stage::Scoring);
        let scored = self.scorer.score_each(collected.candidates).await;
        report.relevant = scored.iter().filter(|s| s.score > 0).count();

        advance(&mut stage, Stage::Selecting);
        let selection = select::top_k(scored, self.cfg.max_daily);
        report.selected = selection.len();

        if selection.is_empty() {
            tracing::info!("no posts passed relevance scoring");
            return Ok(self.finish(&mut stage, report, Outcome::NoSelections));
        }
        for (rank, s) in selection.iter().enumerate() {
            tracing::info!(
                rank = rank + 1,
                score = s.score,
                source = %s.candidate.source_id,
                title = %s.candidate.title,
                "selected"
            );
        }

        advance(&mut stage, Stage::Notifying);
        let selection = select::into_candidates(selection);
        let tally = notify::deliver(self.notifier.as_ref(), &selection).await;
        report.delivered = tally.delivered;
        report.logged_only = tally.logged_only;
        report.delivery_failures = tally.failed;

        let outcome = if report.dry_run {
            Outcome::LoggedOnly
        } else {
            Outcome::Delivered
        };
        Ok(self.finish(&mut stage, report, outcome))
    }

    fn finish(&self, stage: &mut Stage, mut report: RunReport, outcome: Outcome) -> RunReport {
        advance(stage, Stage::Done);
        report.outcome = outcome;
        gauge!("digest_last_run_ts").set(report.started_at.timestamp() as f64);
        tracing::info!(
            outcome = ?report.outcome,
            collected = report.collected,
            selected = report.selected,
            delivered = report.delivered,
            logged_only = report.logged_only,
            failed_sources = report.failed_sources.len(),
            "digest run finished"
        );
        report
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    tracing::debug!(from = ?*stage, to = ?next, "pipeline stage");
    *stage = next;
}
