//! Diagnostics sink: explicitly passed, replace-per-resource semantics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::response::ExecuteAnonymousResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: i64,
    pub column: i64,
    pub message: String,
}

/// Receives the diagnostics for a resource, replacing whatever was recorded
/// for it before. Passed explicitly so the pipeline stays testable without a
/// hosting environment.
pub trait DiagnosticsSink {
    fn replace(&mut self, resource: &Path, diagnostics: Vec<Diagnostic>);
}

#[derive(Debug, Default)]
pub struct MemorySink {
    entries: HashMap<PathBuf, Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn get(&self, resource: &Path) -> &[Diagnostic] {
        self.entries.get(resource).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl DiagnosticsSink for MemorySink {
    fn replace(&mut self, resource: &Path, diagnostics: Vec<Diagnostic>) {
        self.entries.insert(resource.to_path_buf(), diagnostics);
    }
}

/// Derive the diagnostics a normalized result carries: the compile problem
/// when compilation failed, else the runtime exception. Sentinel positions
/// clamp to 0 so a consumer can always anchor the message.
pub fn from_result(result: &ExecuteAnonymousResult) -> Vec<Diagnostic> {
    let message = if !result.compile_problem.is_empty() {
        &result.compile_problem
    } else if !result.exception_message.is_empty() {
        &result.exception_message
    } else {
        return Vec::new();
    };
    vec![Diagnostic {
        line: result.line.max(0),
        column: result.column.max(0),
        message: message.clone(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::UNKNOWN_POSITION;

    fn base_result() -> ExecuteAnonymousResult {
        ExecuteAnonymousResult {
            compiled: true,
            compile_problem: String::new(),
            success: true,
            line: UNKNOWN_POSITION,
            column: UNKNOWN_POSITION,
            exception_message: String::new(),
            exception_stack_trace: String::new(),
            logs: String::new(),
        }
    }

    #[test]
    fn success_carries_no_diagnostics() {
        assert!(from_result(&base_result()).is_empty());
    }

    #[test]
    fn compile_problem_becomes_positioned_diagnostic() {
        let result = ExecuteAnonymousResult {
            compiled: false,
            compile_problem: "Unexpected token".into(),
            success: false,
            line: 4,
            column: 9,
            ..base_result()
        };
        assert_eq!(
            from_result(&result),
            vec![Diagnostic { line: 4, column: 9, message: "Unexpected token".into() }]
        );
    }

    #[test]
    fn sentinel_positions_clamp_to_zero() {
        let result = ExecuteAnonymousResult {
            success: false,
            exception_message: "boom".into(),
            ..base_result()
        };
        let diags = from_result(&result);
        assert_eq!((diags[0].line, diags[0].column), (0, 0));
    }

    #[test]
    fn replace_overwrites_previous_diagnostics() {
        let mut sink = MemorySink::default();
        let resource = Path::new("/tmp/a.apex");
        sink.replace(
            resource,
            vec![Diagnostic { line: 1, column: 1, message: "old".into() }],
        );
        sink.replace(resource, Vec::new());
        assert!(sink.get(resource).is_empty());
        assert!(sink.get(Path::new("/tmp/other.apex")).is_empty());
    }
}
