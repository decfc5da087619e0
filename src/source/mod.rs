//! Input acquisition: capture the Apex source to run and persist it to a
//! scratch file.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Byte range of a selection inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Selection covering a 1-based inclusive line range of `text`. A range
    /// running past the last line is clamped to it; a range starting past
    /// the last line does not exist.
    pub fn lines(text: &str, start: usize, end: usize) -> Option<Self> {
        if start == 0 || end < start || text.is_empty() {
            return None;
        }
        let starts: Vec<usize> = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let nlines = if text.ends_with('\n') {
            starts.len() - 1
        } else {
            starts.len()
        };
        if start > nlines {
            return None;
        }
        let from = starts[start - 1];
        let to = if end >= nlines { text.len() } else { starts[end] };
        Some(Self { start: from, end: to })
    }
}

/// The captured source text plus the scratch file it was persisted to. The
/// scratch file lives exactly as long as the payload, so the path can be
/// handed to downstream tooling for the duration of one invocation.
#[derive(Debug)]
pub struct SourcePayload {
    text: String,
    scratch: NamedTempFile,
}

impl SourcePayload {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }
}

/// Outcome of one acquisition attempt. Cancellation is a normal negative
/// result, not an error; callers must match on it.
#[derive(Debug)]
pub enum Acquisition {
    Cancelled,
    Continue(SourcePayload),
}

impl Acquisition {
    pub fn into_payload(self) -> Option<SourcePayload> {
        match self {
            Acquisition::Cancelled => None,
            Acquisition::Continue(payload) => Some(payload),
        }
    }
}

/// Capture the text to execute from `buffer`: a non-empty selection captures
/// exactly that range, otherwise the whole buffer is taken. The captured
/// text is flushed to a uniquely named scratch file before the payload is
/// returned; a missing buffer, an unsliceable selection, or a persistence
/// failure all yield `Cancelled`. Single attempt, no retry.
pub fn acquire(buffer: Option<&str>, selection: Option<Selection>) -> Acquisition {
    let Some(text) = buffer else {
        return Acquisition::Cancelled;
    };

    let captured = match selection {
        Some(sel) if !sel.is_empty() => {
            match text.get(sel.start..sel.end.min(text.len())) {
                Some(slice) => slice.to_string(),
                None => return Acquisition::Cancelled,
            }
        }
        _ => text.to_string(),
    };

    match persist(&captured) {
        Ok(scratch) => Acquisition::Continue(SourcePayload { text: captured, scratch }),
        Err(_) => Acquisition::Cancelled,
    }
}

fn persist(text: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("apexec-input-")
        .suffix(".apex")
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    // Visible to any subsequent reader before the payload is considered valid
    file.as_file().sync_all()?;
    Ok(file)
}
