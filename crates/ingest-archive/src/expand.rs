use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::extract::extract_archive;
use crate::format::ArchiveFormat;
use crate::options::ExtractOptions;
use crate::report::{ExtractionIssue, ExtractionReport};

/// An archive waiting on the worklist.
#[derive(Debug)]
struct PendingArchive {
    path: PathBuf,
    /// Name used for classification and in issues.
    name: String,
    format: ArchiveFormat,
    /// Extracted from another archive, so removed once expanded.
    nested: bool,
}

/// Expand `archive` into `destination`, then every archive that comes out of
/// it, until nothing expandable is left.
///
/// The root archive is classified by `original_name` because staging files
/// carry no meaningful extension; nested archives are classified by the name
/// they were stored under. Nested archives are deleted after their own
/// expansion, whatever its outcome, and dropped from the report's file list.
///
/// The worklist is explicit and FIFO. There is no cycle detection: an archive
/// that reproduces itself only stops at [`ExtractOptions::max_archives`].
pub fn expand_archive(
    archive: &Path,
    original_name: &str,
    destination: &Path,
    options: &ExtractOptions,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();

    let Some(format) = ArchiveFormat::from_name(original_name) else {
        let error = Error::UnsupportedFormat {
            name: original_name.to_string(),
        };
        report
            .errors
            .push(ExtractionIssue::from_error(original_name, None, &error));
        return report;
    };

    let mut budget = options.budget();
    let mut worklist = VecDeque::from([PendingArchive {
        path: archive.to_path_buf(),
        name: original_name.to_string(),
        format,
        nested: false,
    }]);

    while let Some(pending) = worklist.pop_front() {
        if let Some(max) = options.max_archives {
            if report.archives_expanded >= max {
                let error = Error::LimitExceeded {
                    limit: "archive",
                    max: max as u64,
                };
                warn!(archive = %pending.name, error = %error, "leaving nested archive unexpanded");
                report
                    .errors
                    .push(ExtractionIssue::from_error(&pending.name, None, &error));
                break;
            }
        }

        debug!(archive = %pending.name, format = %pending.format, nested = pending.nested, "expanding");
        let pass = extract_archive(
            &pending.path,
            &pending.name,
            pending.format,
            destination,
            &mut budget,
        );
        report.archives_expanded += 1;

        for name in &pass.extracted {
            if let Some(format) = ArchiveFormat::from_name(name) {
                worklist.push_back(PendingArchive {
                    path: destination.join(name),
                    name: name.clone(),
                    format,
                    nested: true,
                });
            }
        }

        let stopped = pass.stopped;
        report.absorb(pass);

        if pending.nested {
            match ingest_fs::remove_file(&pending.path) {
                Ok(()) => report.forget(&pending.name),
                Err(e) => {
                    warn!(archive = %pending.name, error = %e, "failed to remove expanded archive");
                    report.errors.push(ExtractionIssue::from_error(
                        &pending.name,
                        None,
                        &Error::from(e),
                    ));
                }
            }
        }

        if stopped {
            break;
        }
    }

    info!(
        upload = original_name,
        files = report.files.len(),
        errors = report.errors.len(),
        archives = report.archives_expanded,
        bytes = report.bytes_written,
        "upload expanded"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::IssueKind;
    use tempfile::tempdir;

    #[test]
    fn unsupported_upload_name_is_one_issue() {
        let dir = tempdir().unwrap();
        let staged = dir.path().join("upload");
        std::fs::write(&staged, b"plain text").unwrap();

        let report = expand_archive(&staged, "notes.txt", dir.path(), &ExtractOptions::default());

        assert!(report.files.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, IssueKind::Unsupported);
        assert_eq!(report.archives_expanded, 0);
    }

    #[test]
    fn missing_staging_file_is_reported() {
        let dir = tempdir().unwrap();
        let report = expand_archive(
            &dir.path().join("gone"),
            "a.zip",
            dir.path(),
            &ExtractOptions::default(),
        );
        assert!(report.files.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.archives_expanded, 1);
    }
}
