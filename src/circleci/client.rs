//! CircleCI Client
//!
//! The single, immutable handle shared by every accessor and controller in a
//! run. It pairs the v2 REST client with a v1.1 client (only `follow` still
//! lives there) and carries the organization and VCS type used for slugs.

use super::error::{Error, Result};
use super::rest::RestClient;
use super::slug;
use crate::config::ProviderConfig;

/// Main CircleCI client
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) rest: RestClient,
    pub(crate) v1: RestClient,
    organization: String,
    vcs_type: String,
}

impl Client {
    /// Create a new client from a validated configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let rest = RestClient::new(config.url.clone(), &config.api_token)?;

        let v1_url = rest.base_url().join("../v1.1/").map_err(|e| {
            Error::invalid_input(format!("cannot derive v1.1 URL from '{}': {}", config.url, e))
        })?;
        let v1 = RestClient::new(v1_url, &config.api_token)?;

        tracing::debug!(
            "CircleCI client for {}/{} at {}",
            config.vcs_type,
            config.organization,
            rest.base_url()
        );

        Ok(Self {
            rest,
            v1,
            organization: config.organization.clone(),
            vcs_type: config.vcs_type.clone(),
        })
    }

    /// Default organization for project-scoped calls
    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn vcs_type(&self) -> &str {
        &self.vcs_type
    }

    /// The v2 REST client
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Slug for `project` in `organization`, recomputed on every call
    pub fn slug(&self, organization: &str, project: &str) -> Result<String> {
        slug::project_slug(&self.vcs_type, organization, project)
    }

    /// Owner slug for `organization`
    pub fn organization_slug(&self, organization: &str) -> Result<String> {
        slug::organization_slug(&self.vcs_type, organization)
    }
}
