//! Session collaborator: the authenticated connection triple.

use crate::{config::Config, error::ExecError};

/// Read-only view of an authenticated org connection. The token is never
/// refreshed or validated here beyond the org id prefix extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub instance_url: String,
    pub api_version: String,
    pub access_token: String,
}

impl Session {
    pub fn new(
        instance_url: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let instance_url = instance_url.into().trim_end_matches('/').to_string();
        Self {
            instance_url,
            api_version: api_version.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ExecError> {
        let instance_url = cfg
            .get("SF_INSTANCE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ExecError::MissingSession)?;
        let access_token = cfg
            .get("SF_ACCESS_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ExecError::MissingSession)?;
        let api_version = cfg.get("SF_API_VERSION").unwrap_or_else(|| "50.0".into());
        Ok(Self::new(instance_url, api_version, access_token))
    }

    /// The org id prefix of the access token (everything before the first
    /// '!'). A token without the delimiter cannot address an org.
    pub fn org_id(&self) -> Result<&str, ExecError> {
        self.access_token
            .split_once('!')
            .map(|(prefix, _)| prefix)
            .ok_or(ExecError::MalformedToken)
    }
}
