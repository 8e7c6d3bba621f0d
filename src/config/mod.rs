// src/config/mod.rs
//! Everything the binary resolves before a run: the digest config file and
//! the credentials. The pipeline itself never reads the environment.

pub mod credentials;
pub mod digest;

pub use credentials::{Credentials, RedditCredentials};
pub use digest::{DigestConfig, Listing, OracleSettings, RedditSettings};
