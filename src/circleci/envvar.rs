//! Project environment variables
//!
//! Values are write-only: the API only ever returns a masked form, so
//! existence is decided by name.

use super::client::Client;
use super::error::{absent_on_not_found, Result};
use super::rest::NO_BODY;
use super::slug::{encode_segment, require, require_variable_name};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// An environment variable as returned by the API (value is masked)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Serialize)]
struct NewEnvVar<'a> {
    name: &'a str,
    value: &'a str,
}

impl Client {
    fn envvar_path(&self, org: &str, project: &str, name: Option<&str>) -> Result<String> {
        let slug = self.slug(org, project)?;
        Ok(match name {
            Some(name) => {
                require("environment variable name", name)?;
                format!("project/{}/envvar/{}", slug, encode_segment(name))
            }
            None => format!("project/{}/envvar", slug),
        })
    }

    /// Check whether a project has an environment variable called `name`
    pub async fn has_environment_variable(
        &self,
        org: &str,
        project: &str,
        name: &str,
    ) -> Result<bool> {
        let path = self.envvar_path(org, project, Some(name))?;
        let response = absent_on_not_found(self.rest.send(Method::GET, &path, NO_BODY).await)?;
        Ok(response.is_some())
    }

    /// Get the masked form of an environment variable
    pub async fn get_environment_variable(
        &self,
        org: &str,
        project: &str,
        name: &str,
    ) -> Result<Option<EnvVar>> {
        let path = self.envvar_path(org, project, Some(name))?;
        let response = absent_on_not_found(self.rest.send(Method::GET, &path, NO_BODY).await)?;
        response.map(|r| r.json()).transpose()
    }

    /// Create a project environment variable
    pub async fn create_environment_variable(
        &self,
        org: &str,
        project: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        require_variable_name(name)?;
        let path = self.envvar_path(org, project, None)?;
        self.rest
            .send(Method::POST, &path, Some(&NewEnvVar { name, value }))
            .await?;
        Ok(())
    }

    /// Delete a project environment variable; a missing variable is an error here
    pub async fn delete_environment_variable(
        &self,
        org: &str,
        project: &str,
        name: &str,
    ) -> Result<()> {
        let path = self.envvar_path(org, project, Some(name))?;
        self.rest.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }
}
