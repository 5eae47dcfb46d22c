use std::io;
use std::path::PathBuf;

use crate::format::ArchiveFormat;
use crate::report::IssueKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'{name}' is not a supported archive type")]
    UnsupportedFormat { name: String },

    #[error("{format} support is not compiled in")]
    CodecUnavailable { format: ArchiveFormat },

    #[error("cannot read {format} archive: {reason}")]
    Corrupted {
        format: ArchiveFormat,
        reason: String,
    },

    #[error("failed to read entry {entry}: {reason}")]
    EntryUnreadable { entry: String, reason: String },

    #[error("entry is truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("{limit} limit of {max} reached")]
    LimitExceeded { limit: &'static str, max: u64 },

    #[error(transparent)]
    Fs(#[from] ingest_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn issue_kind(&self) -> IssueKind {
        match self {
            Self::UnsupportedFormat { .. } => IssueKind::Unsupported,
            Self::CodecUnavailable { .. } | Self::Corrupted { .. } => IssueKind::Format,
            Self::LimitExceeded { .. } => IssueKind::Limit,
            Self::EntryUnreadable { .. }
            | Self::Truncated { .. }
            | Self::ExtractionFailed { .. }
            | Self::Fs(_)
            | Self::Io(_) => IssueKind::Io,
        }
    }

    pub fn is_limit(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
