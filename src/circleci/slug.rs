//! Project slugs
//!
//! A slug is the `vcs-type/organization/project` path key the API uses to
//! address a project. It is always recomputed from its parts.

use super::error::{Error, Result};

/// Build the slug for a project. Every segment is percent-encoded.
pub fn project_slug(vcs_type: &str, organization: &str, project: &str) -> Result<String> {
    require("VCS type", vcs_type)?;
    require("organization", organization)?;
    require("project name", project)?;

    Ok(format!(
        "{}/{}/{}",
        urlencoding::encode(vcs_type),
        urlencoding::encode(organization),
        urlencoding::encode(project)
    ))
}

/// Build the `vcs-type/organization` slug used as a context owner.
pub fn organization_slug(vcs_type: &str, organization: &str) -> Result<String> {
    require("VCS type", vcs_type)?;
    require("organization", organization)?;

    Ok(format!(
        "{}/{}",
        urlencoding::encode(vcs_type),
        urlencoding::encode(organization)
    ))
}

/// Split a project slug back into decoded `(organization, project)`.
pub fn parse_project_slug(slug: &str) -> Result<(String, String)> {
    let mut parts = slug.split('/');
    let (Some(vcs), Some(org), Some(project), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::invalid_input(format!(
            "malformed project slug '{}', expected vcs/organization/project",
            slug
        )));
    };

    if vcs.is_empty() || org.is_empty() || project.is_empty() {
        return Err(Error::invalid_input(format!(
            "malformed project slug '{}': empty segment",
            slug
        )));
    }

    Ok((decode(org)?, decode(project)?))
}

/// Percent-encode a single path segment such as a variable name.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn decode(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| Error::invalid_input(format!("slug segment '{}' is not valid UTF-8", segment)))
}

/// Reject identifiers that cannot stand alone as a path segment: blank
/// values, and `.`/`..`, which URL resolution collapses into the parent.
/// `%2E` counts as a dot segment as well, so encoding is no escape.
pub fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{} must not be empty", what)));
    }
    if value == "." || value == ".." {
        return Err(Error::invalid_input(format!(
            "{} '{}' is not a valid path segment",
            what, value
        )));
    }
    Ok(())
}

/// Environment variable names follow `[A-Za-z_][A-Za-z0-9_]*`
pub fn require_variable_name(name: &str) -> Result<()> {
    require("environment variable name", name)?;

    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::invalid_input(format!(
            "invalid environment variable name '{}': use letters, digits and underscores, not starting with a digit",
            name
        )));
    }
    Ok(())
}
