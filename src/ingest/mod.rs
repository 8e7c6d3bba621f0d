// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::error::FetchError;
use crate::ingest::types::{Candidate, SourceClient};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up in the exported textfile).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_posts_fetched_total", "Raw posts returned by sources.");
        describe_counter!(
            "digest_candidates_total",
            "Posts kept after keyword matching."
        );
        describe_counter!(
            "digest_source_errors_total",
            "Source fetches that failed and were skipped."
        );
        describe_histogram!("digest_fetch_ms", "Source fetch time in milliseconds.");
    });
}

/// Output of one collection pass.
#[derive(Debug, Default)]
pub struct Collected {
    /// Matches in source-list order, then discovery order within a source.
    pub candidates: Vec<Candidate>,
    /// Sources skipped because of a recoverable fetch error.
    pub failed_sources: Vec<String>,
}

/// Lower-case and drop empty keywords. An empty keyword would match every post.
pub fn prepare_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Plain substring containment. `text` must already be lower-cased,
/// `keywords` must come from [`prepare_keywords`].
pub fn matches_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Scan `sources` in order and keep every post containing at least one keyword.
///
/// A recoverable failure on one source is logged and recorded in
/// `failed_sources`; the remaining sources are still scanned. Duplicate
/// permalinks across sources are kept as-is.
pub async fn collect<S: AsRef<str>, K: AsRef<str>>(
    client: &dyn SourceClient,
    sources: &[S],
    keywords: &[K],
    per_source_limit: usize,
) -> Result<Collected, FetchError> {
    ensure_metrics_described();

    let keywords = prepare_keywords(keywords);
    let mut out = Collected::default();

    for source in sources {
        let source = source.as_ref();
        tracing::info!(source, client = client.name(), "scanning source");

        let t0 = std::time::Instant::now();
        let fetched = client.fetch_recent(source, per_source_limit).await;
        metrics::histogram!("digest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let posts = match fetched {
            Ok(posts) => posts,
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, source, "source rejected credentials; aborting collection");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, source, "source fetch failed; skipping");
                counter!("digest_source_errors_total").increment(1);
                out.failed_sources.push(source.to_string());
                continue;
            }
        };

        counter!("digest_posts_fetched_total").increment(posts.len() as u64);
        let before = out.candidates.len();
        for post in posts {
            let candidate = Candidate::from_raw(source, post);
            if matches_any(&candidate.combined_text, &keywords) {
                out.candidates.push(candidate);
            }
        }
        let matched = out.candidates.len() - before;
        counter!("digest_candidates_total").increment(matched as u64);
        tracing::debug!(source, matched, "source scanned");
    }

    tracing::info!(
        candidates = out.candidates.len(),
        failed_sources = out.failed_sources.len(),
        "collection finished"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_lowercased_and_empties_dropped() {
        let kw = prepare_keywords(&["Vintage", "", "Zero Waste"]);
        assert_eq!(kw, vec!["vintage".to_string(), "zero waste".to_string()]);
    }

    #[test]
    fn substring_match_is_not_tokenized() {
        let kw = prepare_keywords(&["table"]);
        assert!(matches_any("grilled vegetable skewers", &kw));
        assert!(!matches_any("grilled carrots", &kw));
    }

    #[test]
    fn empty_vocabulary_matches_nothing() {
        let kw = prepare_keywords::<&str>(&["", ""]);
        assert!(!matches_any("anything at all", &kw));
    }

    #[test]
    fn candidate_text_is_lowercased_title_space_body() {
        let c = Candidate::from_raw(
            "Frugal",
            types::RawPost {
                title: "Thrifted SOFA".into(),
                body: "Found it Today".into(),
                external_url: None,
                permalink: "https://reddit.com/r/Frugal/comments/abc/x/".into(),
            },
        );
        assert_eq!(c.combined_text, "thrifted sofa found it today");
        assert_eq!(c.source_id, "Frugal");
    }
}
