//! CircleCI Contexts
//!
//! Organization-owned scopes for sharing secrets across projects, and the
//! environment variables stored in them.

use super::client::Client;
use super::error::{absent_on_not_found, Result};
use super::rest::NO_BODY;
use super::slug::{encode_segment, require, require_variable_name};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Context information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// An environment variable stored in a context (the value is never returned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEnvVar {
    pub variable: String,
    pub context_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One page of a v2 list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Serialize)]
struct ContextOwner<'a> {
    slug: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct NewContext<'a> {
    name: &'a str,
    owner: ContextOwner<'a>,
}

#[derive(Serialize)]
struct NewContextEnvVar<'a> {
    value: &'a str,
}

impl Client {
    /// Fetch every item of a paginated listing
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.rest.endpoint(path)?;
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                if let Some(token) = page_token.as_deref() {
                    pairs.append_pair("page-token", token);
                }
            }
            if url.query() == Some("") {
                url.set_query(None);
            }

            let request = self.rest.new_request(Method::GET, url, NO_BODY)?;
            let page: Page<T> = self.rest.do_request(request).await?.json()?;
            all_items.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_items)
    }

    /// Create a context owned by `org`
    pub async fn create_context(&self, org: &str, name: &str) -> Result<Context> {
        require("context name", name)?;
        let owner = self.organization_slug(org)?;

        let body = NewContext {
            name,
            owner: ContextOwner {
                slug: &owner,
                kind: "organization",
            },
        };

        self.rest
            .send(Method::POST, "context", Some(&body))
            .await?
            .json()
    }

    /// Get a context by id, `None` if it does not exist
    pub async fn get_context(&self, id: &str) -> Result<Option<Context>> {
        require("context id", id)?;
        let path = format!("context/{}", encode_segment(id));
        let response = absent_on_not_found(self.rest.send(Method::GET, &path, NO_BODY).await)?;
        response.map(|r| r.json()).transpose()
    }

    /// Find a context owned by `org` by its name
    pub async fn find_context_by_name(&self, org: &str, name: &str) -> Result<Option<Context>> {
        require("context name", name)?;
        let owner = self.organization_slug(org)?;

        let contexts: Vec<Context> = self
            .list_all(
                "context",
                &[("owner-slug", owner.as_str()), ("owner-type", "organization")],
            )
            .await?;

        Ok(contexts.into_iter().find(|c| c.name == name))
    }

    /// Delete a context and every variable in it
    pub async fn delete_context(&self, id: &str) -> Result<()> {
        require("context id", id)?;
        let path = format!("context/{}", encode_segment(id));
        self.rest.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }

    /// List the variables of a context
    pub async fn list_context_environment_variables(
        &self,
        context_id: &str,
    ) -> Result<Vec<ContextEnvVar>> {
        require("context id", context_id)?;
        let path = format!("context/{}/environment-variable", encode_segment(context_id));
        self.list_all(&path, &[]).await
    }

    /// Check whether a context holds a variable called `name`.
    /// A missing context holds nothing.
    pub async fn has_context_environment_variable(
        &self,
        context_id: &str,
        name: &str,
    ) -> Result<bool> {
        require("environment variable name", name)?;
        let variables =
            absent_on_not_found(self.list_context_environment_variables(context_id).await)?;

        Ok(variables
            .unwrap_or_default()
            .iter()
            .any(|v| v.variable == name))
    }

    /// Create (or overwrite) a context variable
    pub async fn create_context_environment_variable(
        &self,
        context_id: &str,
        name: &str,
        value: &str,
    ) -> Result<()> {
        require("context id", context_id)?;
        require_variable_name(name)?;
        let path = format!(
            "context/{}/environment-variable/{}",
            encode_segment(context_id),
            encode_segment(name)
        );
        self.rest
            .send(Method::PUT, &path, Some(&NewContextEnvVar { value }))
            .await?;
        Ok(())
    }

    /// Delete a context variable
    pub async fn delete_context_environment_variable(
        &self,
        context_id: &str,
        name: &str,
    ) -> Result<()> {
        require("context id", context_id)?;
        require("environment variable name", name)?;
        let path = format!(
            "context/{}/environment-variable/{}",
            encode_segment(context_id),
            encode_segment(name)
        );
        self.rest.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }
}
