use ingest_archive::ExtractionReport;
use serde::Serialize;

use crate::error::Result;
use crate::sanitize::ProjectName;

/// Outcome of one archive upload.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub project: ProjectName,
    /// Name the archive was uploaded under.
    pub filename: String,
    #[serde(flatten)]
    pub extraction: ExtractionReport,
}

/// A file stored by [`save_files`](crate::ProjectStore::save_files).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub filename: String,
    pub stored_as: String,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub filename: String,
    pub message: String,
}

/// Outcome of a direct multi-file save. One failing file does not stop the rest.
#[derive(Clone, Debug, Serialize)]
pub struct SaveReport {
    pub project: ProjectName,
    pub files: Vec<SavedFile>,
    pub failed_files: Vec<FailedFile>,
}

impl SaveReport {
    pub fn new(project: ProjectName) -> Self {
        Self {
            project,
            files: Vec::new(),
            failed_files: Vec::new(),
        }
    }

    pub fn record(&mut self, filename: &str, outcome: Result<SavedFile>) {
        match outcome {
            Ok(saved) => self.files.push(saved),
            Err(e) => self.failed_files.push(FailedFile {
                filename: filename.to_string(),
                message: e.to_string(),
            }),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed_files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sanitize::sanitize_project_name;

    #[test]
    fn record_splits_outcomes() {
        let mut report = SaveReport::new(sanitize_project_name("p").unwrap());
        report.record(
            "a.txt",
            Ok(SavedFile {
                filename: "a.txt".into(),
                stored_as: "a_1.txt".into(),
                size: 3,
            }),
        );
        report.record(
            "",
            Err(Error::InvalidFileName {
                name: String::new(),
            }),
        );

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.failed_files.len(), 1);
        assert!(!report.is_clean());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["project"], "p");
        assert_eq!(json["files"][0]["stored_as"], "a_1.txt");
        assert_eq!(json["failed_files"][0]["message"], "'' is not a usable file name");
    }
}
