// src/config/digest.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DigestError;

pub const ENV_PATH: &str = "DIGEST_CONFIG_PATH";

fn default_per_source_limit() -> usize {
    20
}
fn default_max_daily() -> usize {
    10
}
fn default_max_scale() -> u32 {
    10
}
fn default_brand() -> String {
    "Whoppah, a secondhand design marketplace".to_string()
}
fn default_http_timeout_secs() -> u64 {
    10
}

/// Which subreddit listing to read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl Listing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Listing::Hot => "hot",
            Listing::New => "new",
            Listing::Top => "top",
            Listing::Rising => "rising",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedditSettings {
    #[serde(default)]
    pub listing: Listing,
    #[serde(default = "RedditSettings::default_auth_url")]
    pub auth_url: String,
    #[serde(default = "RedditSettings::default_api_base")]
    pub api_base: String,
}

impl RedditSettings {
    fn default_auth_url() -> String {
        "https://www.reddit.com/api/v1/access_token".to_string()
    }
    fn default_api_base() -> String {
        "https://oauth.reddit.com".to_string()
    }
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            listing: Listing::default(),
            auth_url: Self::default_auth_url(),
            api_base: Self::default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleSettings {
    #[serde(default = "OracleSettings::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "OracleSettings::default_model")]
    pub model: String,
    #[serde(default = "OracleSettings::default_max_tokens")]
    pub max_tokens: u32,
}

impl OracleSettings {
    fn default_endpoint() -> String {
        "https://api.openai.com/v1/chat/completions".to_string()
    }
    fn default_model() -> String {
        "gpt-4".to_string()
    }
    fn default_max_tokens() -> u32 {
        5
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
        }
    }
}

/// Static inputs of one digest run. Loaded by the binary and handed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DigestConfig {
    /// Brand description used in the scoring rubric.
    #[serde(default = "default_brand")]
    pub brand: String,
    /// Subreddits, scanned in this order.
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,
    /// Cap on delivered posts per run.
    #[serde(default = "default_max_daily")]
    pub max_daily: usize,
    #[serde(default = "default_max_scale")]
    pub max_scale: u32,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Prometheus textfile written after the run, if set.
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
    #[serde(default)]
    pub reddit: RedditSettings,
    #[serde(default)]
    pub oracle: OracleSettings,
}

impl DigestConfig {
    /// Built-in seed: the subreddits and vocabulary the digest was first run with.
    pub fn default_seed() -> Self {
        let sources = [
            "Netherlands", "Belgium", "France", "Sweden", "Denmark", "Europe",
            "germany", "Amsterdam", "thehague", "Rotterdam", "Utrecht", "Brussels",
            "Paris", "London", "Antwerpen", "luxembourg", "milano", "rome",
            "ZeroWaste", "ThriftStoreHauls", "BuyItForLife", "Frugal", "Minimalism",
            "SustainableLiving", "SecondHand", "InteriorDesign", "interiordecorating",
            "DesignMyRoom", "MaleLivingSpace", "FemaleLivingSpace", "HomeDecorating",
            "CozyPlaces", "RoomPorn", "amateurroomporn", "HomeImprovement", "DIY",
            "ApartmentHacks", "ScandinavianInterior", "furniture", "Mid_Century",
            "WhatIsThisThing",
        ];
        let keywords = [
            "secondhand", "second-hand", "thrift", "thrifted", "vintage", "used",
            "pre-owned", "preloved", "pre-loved", "reclaimed", "upcycled", "repurposed",
            "handmade", "antique", "restored", "retro", "sustainable", "eco-friendly",
            "eco friendly", "zero waste", "minimalist", "minimalism", "buy it for life",
            "durable", "timeless", "reuse", "resale", "interior", "interior design",
            "home decor", "furniture", "sofa", "table", "chair", "cabinet", "dresser",
            "sideboard", "dining set", "lamp", "rug", "mirror", "art", "poster",
            "wall decor", "shelving", "bookshelf", "tv stand", "bed", "bed frame",
            "nightstand", "storage", "cozy", "scandinavian", "mid-century", "boho",
            "eclectic", "apartment", "renovation", "remodel", "decorating",
        ];
        Self {
            brand: default_brand(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            per_source_limit: default_per_source_limit(),
            max_daily: default_max_daily(),
            max_scale: default_max_scale(),
            http_timeout_secs: default_http_timeout_secs(),
            metrics_path: None,
            reddit: RedditSettings::default(),
            oracle: OracleSettings::default(),
        }
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading digest config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing digest config {}", path.display()))?;
        Ok(cfg.normalized())
    }

    /// Load using env var + fallbacks:
    /// 1) $DIGEST_CONFIG_PATH
    /// 2) config/digest.toml
    /// 3) config/digest.json
    /// 4) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/digest.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/digest.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default_seed().normalized())
    }

    /// Trim + dedup sources (order kept), lowercase + dedup keywords, clamp limits.
    pub fn normalized(mut self) -> Self {
        self.sources = clean_list(self.sources, false);
        self.keywords = clean_list(self.keywords, true);
        self.per_source_limit = self
            .per_source_limit
            .min(crate::ingest::providers::reddit::MAX_PAGE_SIZE);
        self
    }

    /// Reject configurations that could never produce a digest.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.sources.is_empty() {
            return Err(DigestError::Config("no sources configured".into()));
        }
        if self.keywords.is_empty() {
            return Err(DigestError::Config("no keywords configured".into()));
        }
        if self.per_source_limit == 0 {
            return Err(DigestError::Config("per_source_limit must be > 0".into()));
        }
        if self.max_scale == 0 {
            return Err(DigestError::Config("max_scale must be > 0".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(DigestError::Config("http_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<DigestConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            // No usable extension: try JSON first, then TOML.
            if let Ok(v) = serde_json::from_str(s) {
                return Ok(v);
            }
            toml::from_str(s).map_err(|e| anyhow!("unsupported digest config format: {e}"))
        }
    }
}

fn clean_list(items: Vec<String>, lowercase: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() {
            continue;
        }
        let t = if lowercase {
            t.to_lowercase()
        } else {
            t.to_string()
        };
        let dup = if lowercase {
            out.contains(&t)
        } else {
            out.iter().any(|o| o.eq_ignore_ascii_case(&t))
        };
        if !dup {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn clean_list_keeps_order_and_dedups() {
        let sources = vec![" DIY ".into(), "".into(), "Frugal".into(), "diy".into()];
        assert_eq!(clean_list(sources, false), vec!["DIY", "Frugal"]);

        let kws = vec!["Vintage".into(), "vintage".into(), " Zero Waste ".into()];
        assert_eq!(clean_list(kws, true), vec!["vintage", "zero waste"]);
    }

    #[test]
    fn seed_is_valid() {
        let cfg = DigestConfig::default_seed().normalized();
        cfg.validate().unwrap();
        assert_eq!(cfg.per_source_limit, 20);
        assert_eq!(cfg.max_daily, 10);
        assert_eq!(cfg.sources.first().map(String::as_str), Some("Netherlands"));
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so a real config/ in the repo does not interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);

        // Nothing on disk -> built-in seed
        let v = DigestConfig::load_default().unwrap();
        assert_eq!(v, DigestConfig::default_seed().normalized());

        // Env takes precedence
        let p_json = tmp.path().join("digest.json");
        fs::write(&p_json, r#"{"sources":["X"],"keywords":["Y"]}"#).unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = DigestConfig::load_default().unwrap();
        assert_eq!(v2.sources, vec!["X".to_string()]);
        assert_eq!(v2.keywords, vec!["y".to_string()]);
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
