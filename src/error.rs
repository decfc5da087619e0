//! Typed errors for the execution pipeline preconditions.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// No authenticated session could be resolved from the configuration.
    #[error("no authenticated session: set SF_INSTANCE_URL and SF_ACCESS_TOKEN in the environment or ~/.config/apexec/.apexecrc")]
    MissingSession,

    /// The session token carries no '!' delimiter, so the org id prefix
    /// cannot be extracted and no endpoint URL may be built from it.
    #[error("malformed session token: expected an org id prefix before '!'")]
    MalformedToken,
}
