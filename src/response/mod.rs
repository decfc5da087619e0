//! Response normalizer: reduce the raw SOAP reply tree to one flat record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel for a line/column the server did not report.
pub const UNKNOWN_POSITION: i64 = -1;

/// The only artifact exposed to callers: fully populated for every outcome
/// branch, no optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAnonymousResult {
    pub compiled: bool,
    pub compile_problem: String,
    pub success: bool,
    pub line: i64,
    pub column: i64,
    pub exception_message: String,
    pub exception_stack_trace: String,
    pub logs: String,
}

impl ExecuteAnonymousResult {
    /// True when the outcome carries a reportable problem message.
    pub fn has_diagnostic(&self) -> bool {
        !self.compile_problem.is_empty() || !self.exception_message.is_empty()
    }
}

/// Normalize a raw reply tree. Accepts the envelope root as materialized by
/// the transport; element names may carry any namespace prefix or none.
/// Never fails: absent or unrecognized fields degrade to the documented
/// sentinel/empty defaults.
pub fn normalize(raw: &Value) -> ExecuteAnonymousResult {
    let envelope = field(raw, "Envelope").unwrap_or(raw);

    let logs = field(envelope, "Header")
        .and_then(|h| field(h, "DebuggingInfo"))
        .and_then(|d| field(d, "debugLog"))
        .map(text_of)
        .unwrap_or_default();

    let result = field(envelope, "Body")
        .and_then(|b| field(b, "executeAnonymousResponse"))
        .and_then(|r| field(r, "result"));

    let compiled = result
        .and_then(|r| field(r, "compiled"))
        .and_then(coerce_bool)
        .unwrap_or(false);
    let compile_problem = result
        .and_then(|r| field(r, "compileProblem"))
        .map(text_of)
        .unwrap_or_default();
    let line = result
        .and_then(|r| field(r, "line"))
        .and_then(coerce_i64)
        .unwrap_or(UNKNOWN_POSITION);
    let column = result
        .and_then(|r| field(r, "column"))
        .and_then(coerce_i64)
        .unwrap_or(UNKNOWN_POSITION);
    let wire_success = result
        .and_then(|r| field(r, "success"))
        .and_then(coerce_bool)
        .unwrap_or(false);
    let mut exception_message = result
        .and_then(|r| field(r, "exceptionMessage"))
        .map(text_of)
        .unwrap_or_default();
    let mut exception_stack_trace = result
        .and_then(|r| field(r, "exceptionStackTrace"))
        .map(text_of)
        .unwrap_or_default();

    // A compile problem wins when the wire carries both fault shapes; the
    // two are mutually exclusive on a conforming server.
    if !compile_problem.is_empty() {
        exception_message = String::new();
        exception_stack_trace = String::new();
    }

    let success = wire_success
        && compiled
        && exception_message.is_empty()
        && exception_stack_trace.is_empty();

    ExecuteAnonymousResult {
        compiled,
        compile_problem,
        success,
        line,
        column,
        exception_message,
        exception_stack_trace,
        logs,
    }
}

/// Look `name` up in an object, matching either the bare element name or any
/// `prefix:name` qualified form.
fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    let obj = value.as_object()?;
    if let Some(v) = obj.get(name) {
        return Some(v);
    }
    obj.iter().find_map(|(k, v)| {
        k.rsplit_once(':')
            .filter(|(_, local)| *local == name)
            .map(|_| v)
    })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}
