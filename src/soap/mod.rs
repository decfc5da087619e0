//! Request builder: the executeAnonymous SOAP envelope.
//!
//! The wire format is bit-exact SOAP 1.1 with the `xsd`/`env`/`cmd`/`apex`
//! namespaces; altering it breaks server compatibility.

use std::collections::BTreeMap;

use crate::{error::ExecError, session::Session};

/// The server action name. It must appear literally in the `soapaction`
/// header and twice bracketing the body content, all matching.
pub const ACTION: &str = "executeAnonymous";

/// Debug level requested when the debugging header is enabled.
pub const DEBUG_LEVEL: &str = "DEBUGONLY";

/// A wire-ready request: built fresh per execution, owned solely by the
/// caller that issues the transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub endpoint_url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Endpoint for the anonymous execution action:
/// `{instance_url}/services/Soap/s/{api_version}/{org_id}`.
pub fn endpoint_url(session: &Session) -> Result<String, ExecError> {
    let org_id = session.org_id()?;
    Ok(format!(
        "{}/services/Soap/s/{}/{}",
        session.instance_url, session.api_version, org_id
    ))
}

/// Assemble the request. `source_text` is embedded verbatim as character
/// data inside `<apexcode>`; when `debug_enabled` is false the debugging
/// header element is omitted entirely so the server produces no log.
pub fn build(
    session: &Session,
    source_text: &str,
    debug_enabled: bool,
) -> Result<ExecutionRequest, ExecError> {
    build_with_level(session, source_text, debug_enabled.then_some(DEBUG_LEVEL))
}

/// Same as [`build`] with an explicit debug level; `None` omits the header.
pub fn build_with_level(
    session: &Session,
    source_text: &str,
    debug_level: Option<&str>,
) -> Result<ExecutionRequest, ExecError> {
    let endpoint_url = endpoint_url(session)?;

    let debug_header = match debug_level {
        Some(level) => format!(
            "<apex:DebuggingHeader><apex:debugLevel>{level}</apex:debugLevel></apex:DebuggingHeader>"
        ),
        None => String::new(),
    };
    let action_body = format!("<apexcode>{source_text}</apexcode>");
    let body = envelope(&session.access_token, &debug_header, ACTION, &action_body);

    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "text/xml".to_string());
    headers.insert("soapaction".to_string(), ACTION.to_string());

    Ok(ExecutionRequest { endpoint_url, headers, body })
}

fn envelope(session_id: &str, debug_header: &str, action: &str, action_body: &str) -> String {
    format!(
        r#"<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema"
		xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"
		xmlns:cmd="http://soap.sforce.com/2006/08/apex"
		xmlns:apex="http://soap.sforce.com/2006/08/apex">
			<env:Header>
				<cmd:SessionHeader>
					<cmd:sessionId>{session_id}</cmd:sessionId>
				</cmd:SessionHeader>
				{debug_header}
			</env:Header>
			<env:Body>
				<{action} xmlns="http://soap.sforce.com/2006/08/apex">
				    {action_body}
				</{action}>
			</env:Body>
    </env:Envelope>"#
    )
}
