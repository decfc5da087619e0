//! Shared execution helper: session + transport composed per command.

use anyhow::Result;

use crate::{
    response::{self, ExecuteAnonymousResult},
    session::Session,
    soap,
    transport::Transport,
};

/// One authenticated executor. Build the request, hand it to the transport,
/// normalize whatever comes back. Transport failures pass through untouched;
/// normalization itself never fails.
#[derive(Debug)]
pub struct Executor<T: Transport> {
    session: Session,
    transport: T,
    debug_level: Option<String>,
}

impl<T: Transport> Executor<T> {
    pub fn new(session: Session, transport: T) -> Self {
        Self { session, transport, debug_level: None }
    }

    /// Override the debug level requested when the debugging header is on.
    pub fn with_debug_level(mut self, level: Option<String>) -> Self {
        self.debug_level = level;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn execute(
        &self,
        source_text: &str,
        debug_enabled: bool,
    ) -> Result<ExecuteAnonymousResult> {
        let level = if debug_enabled {
            Some(self.debug_level.as_deref().unwrap_or(soap::DEBUG_LEVEL))
        } else {
            None
        };
        let request = soap::build_with_level(&self.session, source_text, level)?;
        let raw = self.transport.request(&request).await?;
        Ok(response::normalize(&raw))
    }
}
