//! Context controller
//!
//! Keyed by the context id. Import also accepts a context name, looked up in
//! the configured organization when the key is not an existing id.

use super::{not_found, read_back, Resource, Tracked};
use crate::circleci::{Client, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredContext {
    pub name: String,
    /// Defaults to the configured organization
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextState {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Tracked for ContextState {
    fn key(&self) -> String {
        self.id.clone()
    }
}

impl From<crate::circleci::Context> for ContextState {
    fn from(context: crate::circleci::Context) -> Self {
        Self {
            id: context.id,
            name: context.name,
            created_at: context.created_at,
        }
    }
}

pub struct ContextResource;

impl Resource for ContextResource {
    const TYPE_NAME: &'static str = "circleci_context";

    type Desired = DesiredContext;
    type State = ContextState;

    async fn create(client: &Client, desired: &DesiredContext) -> Result<ContextState> {
        let org = desired
            .organization
            .as_deref()
            .unwrap_or_else(|| client.organization());

        let created = client.create_context(org, &desired.name).await?;
        read_back::<Self>(client, &created.id).await
    }

    async fn read(client: &Client, key: &str) -> Result<Option<ContextState>> {
        Ok(client.get_context(key).await?.map(ContextState::from))
    }

    async fn delete(client: &Client, key: &str) -> Result<()> {
        client.delete_context(key).await
    }

    async fn import(client: &Client, raw_key: &str) -> Result<ContextState> {
        if Uuid::parse_str(raw_key).is_ok() {
            if let Some(state) = Self::read(client, raw_key).await? {
                return Ok(state);
            }
            // A context may also be named like a UUID
        }

        let found = client
            .find_context_by_name(client.organization(), raw_key)
            .await?
            .ok_or_else(|| not_found::<Self>(raw_key))?;

        read_back::<Self>(client, &found.id).await
    }
}

impl ContextResource {
    /// Look up a context by name without creating it
    pub async fn lookup(client: &Client, org: &str, name: &str) -> Result<Option<ContextState>> {
        Ok(client
            .find_context_by_name(org, name)
            .await?
            .map(ContextState::from))
    }
}
