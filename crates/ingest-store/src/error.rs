use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid project name '{name}'")]
    InvalidIdentifier { name: String },

    #[error("'{name}' is not a supported archive (expected .zip, .tar, .tar.gz, .tgz or .rar)")]
    UnsupportedUpload { name: String },

    #[error("'{name}' is not a usable file name")]
    InvalidFileName { name: String },

    #[error("project '{project}' not found")]
    ProjectNotFound { project: String },

    #[error("file '{file}' not found in project '{project}'")]
    FileNotFound { project: String, file: String },

    #[error("failed to stage upload: {0}")]
    Staging(#[source] io::Error),

    #[error("extraction task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Fs(#[from] ingest_fs::Error),
}

/// How a caller should treat an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was written.
    Validation,
    NotFound,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier { .. }
            | Self::UnsupportedUpload { .. }
            | Self::InvalidFileName { .. } => ErrorKind::Validation,
            Self::ProjectNotFound { .. } | Self::FileNotFound { .. } => ErrorKind::NotFound,
            Self::Staging(_) | Self::Task(_) | Self::Fs(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
