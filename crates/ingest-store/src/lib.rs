//! Project-scoped storage for uploaded archives and files.
//!
//! A project is a directory under the store root holding a flat set of
//! files. Archives are staged to disk, then expanded recursively into the
//! project with [`ingest_archive::expand_archive`].

mod error;
mod report;
mod sanitize;
pub mod staging;
mod store;

pub use error::{Error, ErrorKind, Result};
pub use ingest_archive::{ExtractOptions, ExtractionIssue, ExtractionReport, IssueKind};
pub use report::{FailedFile, SaveReport, SavedFile, UploadReport};
pub use sanitize::{ProjectName, sanitize_project_name};
pub use staging::{StagingFile, write_stream};
pub use store::{ProjectStore, StoreOptions};
