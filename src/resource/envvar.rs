//! Project environment variable controller
//!
//! Keyed by `<project-slug>:<name>`. The value is write-only and never part
//! of refreshed state; changing it means delete then create.

use super::{read_back, split_key, Resource, Tracked};
use crate::circleci::slug::parse_project_slug;
use crate::circleci::{Client, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredEnvironmentVariable {
    /// Defaults to the configured organization
    #[serde(default)]
    pub organization: Option<String>,
    pub project: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariableState {
    pub organization: String,
    pub project: String,
    pub name: String,
    pub slug: String,
}

impl Tracked for EnvironmentVariableState {
    fn key(&self) -> String {
        format!("{}:{}", self.slug, self.name)
    }
}

/// Parsed `<slug>:<name>` key
struct Key {
    organization: String,
    project: String,
    name: String,
}

fn parse_key(key: &str) -> Result<Key> {
    let (slug, name) = split_key(EnvironmentVariableResource::TYPE_NAME, key)?;
    let (organization, project) = parse_project_slug(slug)?;
    Ok(Key {
        organization,
        project,
        name: name.to_string(),
    })
}

pub struct EnvironmentVariableResource;

impl Resource for EnvironmentVariableResource {
    const TYPE_NAME: &'static str = "circleci_environment_variable";

    type Desired = DesiredEnvironmentVariable;
    type State = EnvironmentVariableState;

    async fn create(
        client: &Client,
        desired: &DesiredEnvironmentVariable,
    ) -> Result<EnvironmentVariableState> {
        let org = desired
            .organization
            .as_deref()
            .unwrap_or_else(|| client.organization());

        client
            .create_environment_variable(org, &desired.project, &desired.name, &desired.value)
            .await?;

        let key = format!("{}:{}", client.slug(org, &desired.project)?, desired.name);
        read_back::<Self>(client, &key).await
    }

    async fn read(client: &Client, key: &str) -> Result<Option<EnvironmentVariableState>> {
        let key = parse_key(key)?;

        if !client
            .has_environment_variable(&key.organization, &key.project, &key.name)
            .await?
        {
            return Ok(None);
        }

        let slug = client.slug(&key.organization, &key.project)?;
        Ok(Some(EnvironmentVariableState {
            organization: key.organization,
            project: key.project,
            name: key.name,
            slug,
        }))
    }

    async fn delete(client: &Client, key: &str) -> Result<()> {
        let key = parse_key(key)?;
        client
            .delete_environment_variable(&key.organization, &key.project, &key.name)
            .await
    }
}

impl EnvironmentVariableResource {
    /// Converge to `desired` whatever the current value: delete an existing
    /// variable of the same name, then create it.
    pub async fn replace(
        client: &Client,
        desired: &DesiredEnvironmentVariable,
    ) -> Result<EnvironmentVariableState> {
        let org = desired
            .organization
            .as_deref()
            .unwrap_or_else(|| client.organization());

        if client
            .has_environment_variable(org, &desired.project, &desired.name)
            .await?
        {
            tracing::debug!("Replacing {} in {}/{}", desired.name, org, desired.project);
            client
                .delete_environment_variable(org, &desired.project, &desired.name)
                .await?;
        }

        Self::create(client, desired).await
    }
}
