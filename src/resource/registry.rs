//! Resource Registry
//!
//! Maps resource type names to their controllers so callers holding only a
//! type name and a key (state files, the command line) can drive them.

use super::context::ContextResource;
use super::context_envvar::ContextEnvironmentVariableResource;
use super::envvar::EnvironmentVariableResource;
use super::project::ProjectResource;
use super::{Resource, Tracked};
use crate::circleci::{Client, Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    EnvironmentVariable,
    Context,
    ContextEnvironmentVariable,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Project,
        ResourceKind::EnvironmentVariable,
        ResourceKind::Context,
        ResourceKind::ContextEnvironmentVariable,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Project => ProjectResource::TYPE_NAME,
            Self::EnvironmentVariable => EnvironmentVariableResource::TYPE_NAME,
            Self::Context => ContextResource::TYPE_NAME,
            Self::ContextEnvironmentVariable => ContextEnvironmentVariableResource::TYPE_NAME,
        }
    }

    /// Refresh an instance; `None` if it is gone
    pub async fn read(self, client: &Client, key: &str) -> Result<Option<Value>> {
        match self {
            Self::Project => to_json(ProjectResource::read(client, key).await?),
            Self::EnvironmentVariable => {
                to_json(EnvironmentVariableResource::read(client, key).await?)
            }
            Self::Context => to_json(ContextResource::read(client, key).await?),
            Self::ContextEnvironmentVariable => {
                to_json(ContextEnvironmentVariableResource::read(client, key).await?)
            }
        }
    }

    /// Import an existing instance, returning its key and state
    pub async fn import(self, client: &Client, raw_key: &str) -> Result<(String, Value)> {
        match self {
            Self::Project => keyed(ProjectResource::import(client, raw_key).await?),
            Self::EnvironmentVariable => {
                keyed(EnvironmentVariableResource::import(client, raw_key).await?)
            }
            Self::Context => keyed(ContextResource::import(client, raw_key).await?),
            Self::ContextEnvironmentVariable => {
                keyed(ContextEnvironmentVariableResource::import(client, raw_key).await?)
            }
        }
    }

    pub async fn delete(self, client: &Client, key: &str) -> Result<()> {
        match self {
            Self::Project => ProjectResource::delete(client, key).await,
            Self::EnvironmentVariable => EnvironmentVariableResource::delete(client, key).await,
            Self::Context => ContextResource::delete(client, key).await,
            Self::ContextEnvironmentVariable => {
                ContextEnvironmentVariableResource::delete(client, key).await
            }
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    /// Accepts the full type name or the name without the `circleci_` prefix
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| {
                let name = kind.type_name();
                name == wanted || name.strip_prefix("circleci_") == Some(wanted.as_str())
            })
            .ok_or_else(|| Error::invalid_input(format!("unknown resource type '{}'", s)))
    }
}

fn to_json<S: Tracked>(state: Option<S>) -> Result<Option<Value>> {
    state
        .map(|s| serde_json::to_value(s).map_err(|e| Error::invalid_input(e.to_string())))
        .transpose()
}

fn keyed<S: Tracked>(state: S) -> Result<(String, Value)> {
    let key = state.key();
    let value = serde_json::to_value(state).map_err(|e| Error::invalid_input(e.to_string()))?;
    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_short_names() {
        assert_eq!(
            "circleci_project".parse::<ResourceKind>().unwrap(),
            ResourceKind::Project
        );
        assert_eq!(
            "context-environment-variable".parse::<ResourceKind>().unwrap(),
            ResourceKind::ContextEnvironmentVariable
        );
        assert_eq!(
            "environment_variable".parse::<ResourceKind>().unwrap(),
            ResourceKind::EnvironmentVariable
        );
    }

    #[test]
    fn test_unknown_type_is_invalid_input() {
        assert!(matches!(
            "circleci_pipeline".parse::<ResourceKind>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_type_names_are_unique() {
        let mut names: Vec<_> = ResourceKind::ALL.iter().map(|k| k.type_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ResourceKind::ALL.len());
    }
}
