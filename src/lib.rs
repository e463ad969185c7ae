//! # Siteforge (content backend + hosting provisioner)
//!
//! `siteforge` turns a single request into a ready-to-deploy site: a project on
//! the content platform, a dataset inside it, a scoped API token, and a hosting
//! project linked to the site repository with the content identifiers injected
//! as environment variables.
//!
//! ## Pipeline
//!
//! Every run is a strictly ordered chain of remote calls. A step only starts once
//! its predecessor has returned, and the first failure stops the chain:
//!
//! 1. create the content project
//! 2. create (upsert) the dataset
//! 3. create the access token (its secret is disclosed exactly once)
//! 4. create the hosting project
//! 5. upsert the three environment variables
//!
//! Nothing is rolled back on failure. Resources created before the failing step
//! are reported back to the caller so they can be cleaned up by hand.
//!
//! ## Secrets
//!
//! Platform credentials and the one-time token secret are carried as
//! `secrecy::SecretString` and never reach a log line or a response body.

pub mod api;
pub mod cli;
pub mod content;
pub mod hosting;
mod http;
pub mod provision;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
