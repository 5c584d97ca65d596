//! Reconcile declared CircleCI resources against the CircleCI API.
//!
//! - [`circleci`] - typed API client: slugs, REST layer, accessors, errors
//! - [`resource`] - per-kind reconciliation controllers
//! - [`config`] - provider configuration resolution
//! - [`manifest`] - declared resources and the apply walk

pub mod circleci;
pub mod config;
pub mod manifest;
pub mod resource;

/// Version injected at compile time via CIRCLESYNC_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("CIRCLESYNC_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
