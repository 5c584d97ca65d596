//! Context environment variable controller
//!
//! Keyed by `<context-id>:<name>`. Like project variables, the value is
//! write-only.

use super::{read_back, split_key, Resource, Tracked};
use crate::circleci::{Client, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredContextEnvironmentVariable {
    pub context_id: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEnvironmentVariableState {
    pub context_id: String,
    pub name: String,
}

impl Tracked for ContextEnvironmentVariableState {
    fn key(&self) -> String {
        format!("{}:{}", self.context_id, self.name)
    }
}

pub struct ContextEnvironmentVariableResource;

impl Resource for ContextEnvironmentVariableResource {
    const TYPE_NAME: &'static str = "circleci_context_environment_variable";

    type Desired = DesiredContextEnvironmentVariable;
    type State = ContextEnvironmentVariableState;

    async fn create(
        client: &Client,
        desired: &DesiredContextEnvironmentVariable,
    ) -> Result<ContextEnvironmentVariableState> {
        client
            .create_context_environment_variable(&desired.context_id, &desired.name, &desired.value)
            .await?;

        let key = format!("{}:{}", desired.context_id, desired.name);
        read_back::<Self>(client, &key).await
    }

    async fn read(client: &Client, key: &str) -> Result<Option<ContextEnvironmentVariableState>> {
        let (context_id, name) = split_key(Self::TYPE_NAME, key)?;

        if !client
            .has_context_environment_variable(context_id, name)
            .await?
        {
            return Ok(None);
        }

        Ok(Some(ContextEnvironmentVariableState {
            context_id: context_id.to_string(),
            name: name.to_string(),
        }))
    }

    async fn delete(client: &Client, key: &str) -> Result<()> {
        let (context_id, name) = split_key(Self::TYPE_NAME, key)?;
        client
            .delete_context_environment_variable(context_id, name)
            .await
    }
}
