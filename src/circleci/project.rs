//! CircleCI Projects
//!
//! Following a repository and reading the resulting project.

use super::client::Client;
use super::error::{absent_on_not_found, Result};
use super::rest::NO_BODY;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Project information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub name: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_slug: Option<String>,
}

impl Client {
    /// Start building `name` in the configured organization.
    ///
    /// Following an already-followed project succeeds. The API answers
    /// `400 Branch not found` when the repository is empty, yet it still
    /// follows the project; that response is treated as success.
    pub async fn follow_project(&self, name: &str) -> Result<()> {
        let slug = self.slug(self.organization(), name)?;

        let result = self
            .v1
            .send(Method::POST, &format!("project/{}/follow", slug), NO_BODY)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if err.http().is_some_and(|e| e.is_branch_not_found()) => {
                tracing::debug!("Followed {} with an empty repository", slug);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Get a project in the configured organization, `None` if it does not exist
    pub async fn get_project(&self, name: &str) -> Result<Option<Project>> {
        let slug = self.slug(self.organization(), name)?;

        let response = absent_on_not_found(
            self.rest
                .send(Method::GET, &format!("project/{}", slug), NO_BODY)
                .await,
        )?;

        response.map(|r| r.json()).transpose()
    }
}
