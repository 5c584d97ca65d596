//! Declared resources
//!
//! A YAML manifest listing the projects, environment variables and contexts
//! that should exist, and the ordered walk that converges them.

use crate::circleci::{Client, Error, Result};
use crate::resource::context::{ContextResource, DesiredContext};
use crate::resource::context_envvar::{
    ContextEnvironmentVariableResource, DesiredContextEnvironmentVariable,
};
use crate::resource::envvar::{DesiredEnvironmentVariable, EnvironmentVariableResource};
use crate::resource::project::{DesiredProject, ProjectResource};
use crate::resource::{Resource, Tracked};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub environment_variables: Vec<DesiredEnvironmentVariable>,
    #[serde(default)]
    pub contexts: Vec<DeclaredContext>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeclaredContext {
    pub name: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// One converged resource
#[derive(Debug, Clone, Serialize)]
pub struct Applied {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub key: String,
    pub state: Value,
}

impl Applied {
    fn new<R: Resource>(state: R::State) -> Result<Self> {
        let key = state.key();
        let state = serde_json::to_value(state).map_err(|e| Error::invalid_input(e.to_string()))?;
        Ok(Self {
            type_name: R::TYPE_NAME,
            key,
            state,
        })
    }
}

impl Manifest {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::invalid_input(format!("invalid manifest: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("cannot read manifest {:?}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Converge every declared resource in order: projects, project
    /// variables, then contexts with their variables. Stops at the first error.
    pub async fn apply(&self, client: &Client) -> Result<Vec<Applied>> {
        let mut applied = Vec::new();

        for name in &self.projects {
            tracing::info!("Following project {}", name);
            let desired = DesiredProject { name: name.clone() };
            let state = ProjectResource::create(client, &desired).await?;
            applied.push(Applied::new::<ProjectResource>(state)?);
        }

        for variable in &self.environment_variables {
            tracing::info!("Setting {} on {}", variable.name, variable.project);
            let state = EnvironmentVariableResource::replace(client, variable).await?;
            applied.push(Applied::new::<EnvironmentVariableResource>(state)?);
        }

        for declared in &self.contexts {
            let org = declared
                .organization
                .as_deref()
                .unwrap_or_else(|| client.organization());

            let context = match ContextResource::lookup(client, org, &declared.name).await? {
                Some(existing) => existing,
                None => {
                    tracing::info!("Creating context {}", declared.name);
                    let desired = DesiredContext {
                        name: declared.name.clone(),
                        organization: declared.organization.clone(),
                    };
                    ContextResource::create(client, &desired).await?
                }
            };
            let context_id = context.id.clone();
            applied.push(Applied::new::<ContextResource>(context)?);

            for (name, value) in &declared.variables {
                tracing::info!("Setting {} in context {}", name, declared.name);
                let desired = DesiredContextEnvironmentVariable {
                    context_id: context_id.clone(),
                    name: name.clone(),
                    value: value.clone(),
                };
                let state = ContextEnvironmentVariableResource::create(client, &desired).await?;
                applied.push(Applied::new::<ContextEnvironmentVariableResource>(state)?);
            }
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = Manifest::from_yaml(
            r#"
projects: [web, api]
environment_variables:
  - project: web
    name: API_KEY
    value: secret123
  - organization: other
    project: api
    name: TOKEN
    value: t
contexts:
  - name: deploy
    variables:
      AWS_KEY: abc
"#,
        )
        .unwrap();

        assert_eq!(manifest.projects, vec!["web", "api"]);
        assert_eq!(manifest.environment_variables.len(), 2);
        assert_eq!(manifest.environment_variables[0].organization, None);
        assert_eq!(
            manifest.environment_variables[1].organization.as_deref(),
            Some("other")
        );
        assert_eq!(manifest.contexts[0].variables["AWS_KEY"], "abc");
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        assert_eq!(Manifest::from_yaml("{}").unwrap(), Manifest::default());
    }

    #[test]
    fn test_malformed_manifest_is_invalid_input() {
        let result = Manifest::from_yaml("projects: {name: web}");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
