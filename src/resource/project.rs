//! Project controller
//!
//! Projects are followed, never deleted remotely. State carries the remote
//! `id` since schema version 1; version 0 records only held the name.

use super::{read_back, Resource, Tracked};
use crate::circleci::{Client, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current state schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredProject {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub name: String,
    pub id: String,
    pub slug: String,
}

impl Tracked for ProjectState {
    fn key(&self) -> String {
        self.name.clone()
    }
}

pub struct ProjectResource;

impl Resource for ProjectResource {
    const TYPE_NAME: &'static str = "circleci_project";

    type Desired = DesiredProject;
    type State = ProjectState;

    async fn create(client: &Client, desired: &DesiredProject) -> Result<ProjectState> {
        client.follow_project(&desired.name).await?;
        read_back::<Self>(client, &desired.name).await
    }

    async fn read(client: &Client, key: &str) -> Result<Option<ProjectState>> {
        let project = client.get_project(key).await?;

        Ok(project.map(|p| ProjectState {
            name: p.name,
            id: p.id,
            slug: p.slug,
        }))
    }

    async fn delete(_client: &Client, key: &str) -> Result<()> {
        tracing::debug!("Project {} stays followed remotely; dropping local tracking only", key);
        Ok(())
    }
}

impl ProjectResource {
    /// Migrate a raw state record written with schema `version` to the current one
    pub async fn upgrade_state(
        client: &Client,
        version: u32,
        raw: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        match version {
            0 => Self::upgrade_v0(client, raw).await,
            SCHEMA_VERSION => Ok(raw),
            other => Err(Error::Migration {
                name: raw_name(&raw).unwrap_or("<unknown>").to_string(),
                reason: format!("unknown schema version {}", other),
            }),
        }
    }

    /// v0 records hold only `name`; v1 adds the remote `id`
    pub async fn upgrade_v0(
        client: &Client,
        mut raw: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let name = raw_name(&raw)
            .ok_or_else(|| Error::Migration {
                name: "<unknown>".to_string(),
                reason: "record has no name".to_string(),
            })?
            .to_string();

        let lookup = client.get_project(&name).await;
        let project = match lookup {
            Ok(Some(project)) => project,
            Ok(None) => {
                return Err(Error::Migration {
                    name,
                    reason: "project no longer exists".to_string(),
                })
            }
            Err(err) => {
                return Err(Error::Migration {
                    name,
                    reason: err.to_string(),
                })
            }
        };

        raw.insert("id".to_string(), Value::String(project.id));
        Ok(raw)
    }
}

fn raw_name(raw: &Map<String, Value>) -> Option<&str> {
    raw.get("name").and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}
