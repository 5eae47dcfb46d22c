use std::fmt;

use serde::Serialize;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The container could not be opened or parsed.
    Format,
    Io,
    Unsupported,
    Limit,
}

/// One problem met while expanding an upload. Never aborts the run by itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractionIssue {
    pub kind: IssueKind,
    pub archive: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    pub message: String,
}

impl ExtractionIssue {
    pub fn from_error(archive: &str, entry: Option<&str>, error: &Error) -> Self {
        Self {
            kind: error.issue_kind(),
            archive: archive.to_string(),
            entry: entry.map(str::to_string),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ExtractionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{}: {}: {}", self.archive, entry, self.message),
            None => write!(f, "{}: {}", self.archive, self.message),
        }
    }
}

/// Outcome of expanding one upload, nested archives included.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExtractionReport {
    /// Names written to the destination, in extraction order. Nested archives
    /// that were expanded and removed are not listed.
    pub files: Vec<String>,
    pub errors: Vec<ExtractionIssue>,
    pub archives_expanded: usize,
    pub bytes_written: u64,
}

impl ExtractionReport {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn absorb(&mut self, pass: ArchivePass) {
        self.files.extend(pass.extracted);
        self.errors.extend(pass.issues);
        self.bytes_written += pass.bytes_written;
    }

    /// Drop a name that no longer exists in the destination.
    pub(crate) fn forget(&mut self, name: &str) {
        if let Some(pos) = self.files.iter().position(|f| f == name) {
            self.files.remove(pos);
        }
    }
}

/// What a single call of [`extract_archive`](crate::extract_archive) produced.
#[derive(Debug, Default)]
pub struct ArchivePass {
    pub extracted: Vec<String>,
    pub issues: Vec<ExtractionIssue>,
    pub bytes_written: u64,
    /// A limit was hit; the caller should not expand anything further.
    pub stopped: bool,
}

impl ArchivePass {
    pub(crate) fn record(&mut self, archive: &str, entry: Option<&str>, error: Error) {
        tracing::warn!(
            archive,
            entry = entry.unwrap_or("-"),
            error = %error,
            "extraction issue"
        );
        if error.is_limit() {
            self.stopped = true;
        }
        self.issues
            .push(ExtractionIssue::from_error(archive, entry, &error));
    }
}
