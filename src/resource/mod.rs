//! Reconciliation controllers
//!
//! One controller per resource kind. Each drives a single resource instance
//! through `Unknown -> Present -> Gone` using the accessors on
//! [`Client`]. Every entry point takes the client explicitly.
//!
//! # Architecture
//!
//! - [`project`] - Followed projects (delete is local only)
//! - [`envvar`] - Project environment variables
//! - [`context`] - Contexts
//! - [`context_envvar`] - Context environment variables
//! - [`registry`] - Resource type names and dispatch by name
//!
//! # Example
//!
//! ```ignore
//! use circlesync::resource::{project::{ProjectResource, DesiredProject}, Resource};
//!
//! async fn follow(client: &Client) -> circlesync::circleci::Result<()> {
//!     let state = ProjectResource::create(client, &DesiredProject { name: "web".into() }).await?;
//!     assert!(ProjectResource::read(client, &state.key()).await?.is_some());
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod context_envvar;
pub mod envvar;
pub mod project;
pub mod registry;

use crate::circleci::{Client, Error, Result};
use serde::Serialize;

pub use registry::ResourceKind;

/// Refreshed state of a resource instance
pub trait Tracked: Serialize {
    /// The natural key the orchestrator tracks this instance by
    fn key(&self) -> String;
}

/// Lifecycle entry points shared by every resource kind
#[allow(async_fn_in_trait)]
pub trait Resource {
    /// Type name, e.g. `circleci_project`
    const TYPE_NAME: &'static str;

    /// Declared configuration
    type Desired;
    /// Refreshed state
    type State: Tracked;

    /// Create the remote resource, then read it back
    async fn create(client: &Client, desired: &Self::Desired) -> Result<Self::State>;

    /// `None` means the resource is gone, whether deleted or never created
    async fn read(client: &Client, key: &str) -> Result<Option<Self::State>>;

    async fn delete(client: &Client, key: &str) -> Result<()>;

    /// Hydrate an existing remote resource from its key
    async fn import(client: &Client, raw_key: &str) -> Result<Self::State> {
        Self::read(client, raw_key)
            .await?
            .ok_or_else(|| not_found::<Self>(raw_key))
    }
}

/// Read-after-write: a mutation only counts once the resource reads back.
pub(crate) async fn read_back<R: Resource>(client: &Client, key: &str) -> Result<R::State> {
    R::read(client, key)
        .await?
        .ok_or_else(|| not_found::<R>(key))
}

pub(crate) fn not_found<R: Resource + ?Sized>(key: &str) -> Error {
    Error::NotFound {
        kind: R::TYPE_NAME,
        key: key.to_string(),
    }
}

/// Split a `scope:name` composite key at its last `:`
pub(crate) fn split_key<'a>(kind: &str, key: &'a str) -> Result<(&'a str, &'a str)> {
    match key.rsplit_once(':') {
        Some((scope, name)) if !scope.is_empty() && !name.is_empty() => Ok((scope, name)),
        _ => Err(Error::invalid_input(format!(
            "malformed {} key '{}', expected <scope>:<name>",
            kind, key
        ))),
    }
}
