//! Recursive archive expansion into a flat directory.
//!
//! # Architecture
//!
//! - `format.rs` - Suffix-based classification and tar codecs
//! - `extract/` - Per-format entry sources and the single-archive extractor
//! - `expand.rs` - Worklist over nested archives
//! - `options.rs` - Per-upload limits
//! - `report.rs` - Extraction results and issues
//!
//! Entry paths are flattened to their final component, so nothing is ever
//! written outside the destination directory.

pub use error::{Error, Result};
pub use expand::expand_archive;
pub use extract::{EntrySource, PendingEntry, PendingEntryKind, extract_archive, open_source};
pub use format::{ArchiveFormat, TarCompress, is_archive_name};
pub use options::{Budget, ExtractOptions};
pub use report::{ArchivePass, ExtractionIssue, ExtractionReport, IssueKind};

mod error;
mod expand;
pub mod extract;
mod format;
mod options;
mod report;
