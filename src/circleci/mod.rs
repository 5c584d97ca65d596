//! CircleCI API interaction module
//!
//! This module provides the typed client the reconciliation controllers are
//! built on: slug resolution, the authenticated REST layer, and one set of
//! accessors per resource kind.
//!
//! # Module Structure
//!
//! - [`slug`] - Project and organization slug resolution
//! - [`rest`] - Authenticated JSON requests and response classification
//! - [`client`] - The per-run client handle (v2 plus v1.1 for `follow`)
//! - [`project`] - Following and reading projects
//! - [`envvar`] - Project environment variables
//! - [`context`] - Contexts and their environment variables
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use circlesync::circleci::Client;
//! use circlesync::config::ProviderConfig;
//!
//! async fn example() -> circlesync::circleci::Result<()> {
//!     let config = ProviderConfig::new("token", "github", "acme", "https://circleci.com/api/v2/")?;
//!     let client = Client::new(&config)?;
//!     client.follow_project("web").await?;
//!     let project = client.get_project("web").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod context;
pub mod envvar;
pub mod error;
pub mod project;
pub mod rest;
pub mod slug;

pub use client::Client;
pub use context::{Context, ContextEnvVar, Page};
pub use envvar::EnvVar;
pub use error::{Error, HttpError, Result};
pub use project::Project;
