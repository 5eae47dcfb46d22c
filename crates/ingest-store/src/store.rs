use std::path::{Path, PathBuf};

use ingest_archive::{ExtractOptions, expand_archive, is_archive_name};
use ingest_fs::Listing;
use tokio::io::AsyncRead;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::report::{SaveReport, SavedFile, UploadReport};
use crate::sanitize::{ProjectName, sanitize_project_name};
use crate::staging::{StagingFile, write_stream};

#[derive(Clone, Debug, Default)]
pub struct StoreOptions {
    /// Where uploads are staged. Defaults to the system temp directory.
    pub staging_dir: Option<PathBuf>,
    pub extract: ExtractOptions,
}

/// Projects as directories under one root: `<root>/<project>/<file>`.
///
/// Holds no state besides paths, so clones are cheap and every operation
/// goes straight to the filesystem.
#[derive(Clone, Debug)]
pub struct ProjectStore {
    root: PathBuf,
    staging_dir: PathBuf,
    extract: ExtractOptions,
}

impl ProjectStore {
    /// Open the store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let root = root.into();
        ingest_fs::ensure_dir(&root)?;
        let staging_dir = options.staging_dir.unwrap_or_else(std::env::temp_dir);

        info!(
            root = %root.display(),
            staging = %staging_dir.display(),
            "project store opened"
        );
        Ok(Self {
            root,
            staging_dir,
            extract: options.extract,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, project: &ProjectName) -> PathBuf {
        self.root.join(project.as_str())
    }

    /// Existing project directory, or `ProjectNotFound`.
    fn existing_project(&self, raw: &str) -> Result<(ProjectName, PathBuf)> {
        let project = sanitize_project_name(raw)?;
        let dir = self.project_dir(&project);
        if !dir.is_dir() {
            return Err(Error::ProjectNotFound {
                project: project.to_string(),
            });
        }
        Ok((project, dir))
    }

    /// Sorted project names. Directories that could not have been created
    /// through the store are left out.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let names = ingest_fs::list_names(&self.root, Listing::Directories)?;
        Ok(names
            .into_iter()
            .filter(|name| ProjectName::is_valid(name))
            .collect())
    }

    /// Sorted file names in `project`; empty when the project does not exist.
    pub fn list_files(&self, project: &str) -> Vec<String> {
        let Ok(project) = sanitize_project_name(project) else {
            return Vec::new();
        };
        match ingest_fs::list_names(self.project_dir(&project), Listing::All) {
            Ok(names) => names,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => {
                warn!(%project, error = %e, "failed to list project");
                Vec::new()
            }
        }
    }

    pub fn delete_file(&self, project: &str, file: &str) -> Result<()> {
        let (project, dir) = self.existing_project(project)?;
        let not_found = || Error::FileNotFound {
            project: project.to_string(),
            file: file.to_string(),
        };

        if !ingest_fs::is_plain_name(file) {
            return Err(not_found());
        }
        let path = dir.join(file);
        match std::fs::symlink_metadata(&path) {
            Ok(meta) if !meta.is_dir() => {}
            _ => return Err(not_found()),
        }

        ingest_fs::remove_file(&path).map_err(|e| {
            if e.is_not_found() {
                not_found()
            } else {
                Error::from(e)
            }
        })?;
        info!(%project, file, "file deleted");
        Ok(())
    }

    /// Remove the project directory and everything in it.
    pub fn delete_project(&self, project: &str) -> Result<()> {
        let (project, dir) = self.existing_project(project)?;
        ingest_fs::remove_dir_all(&dir).map_err(|e| {
            if e.is_not_found() {
                Error::ProjectNotFound {
                    project: project.to_string(),
                }
            } else {
                Error::from(e)
            }
        })?;
        info!(%project, "project deleted");
        Ok(())
    }

    /// Stage `reader`, then expand it into the project as `filename`'s format.
    ///
    /// The project name and archive type are checked before anything is
    /// written. Problems inside the archive end up in the report; only
    /// staging failures are errors. The staging file is gone once this returns.
    pub async fn upload_archive<R>(
        &self,
        project: &str,
        filename: &str,
        reader: &mut R,
    ) -> Result<UploadReport>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let project = sanitize_project_name(project)?;
        if !is_archive_name(filename) {
            return Err(Error::UnsupportedUpload {
                name: filename.to_string(),
            });
        }

        let staged = StagingFile::receive(&self.staging_dir, reader)
            .await
            .map_err(Error::Staging)?;
        info!(%project, filename, size = staged.size(), "upload received");

        let destination = self.project_dir(&project);
        ingest_fs::ensure_dir(&destination)?;

        let options = self.extract;
        let name = filename.to_string();
        let extraction = tokio::task::spawn_blocking(move || {
            let report = expand_archive(staged.path(), &name, &destination, &options);
            drop(staged);
            report
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?;

        Ok(UploadReport {
            project,
            filename: filename.to_string(),
            extraction,
        })
    }

    /// Store one file as-is under a collision-free version of its base name.
    pub async fn save_file<R>(
        &self,
        project: &ProjectName,
        filename: &str,
        reader: &mut R,
    ) -> Result<SavedFile>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let name = ingest_fs::file_name_of(filename).ok_or_else(|| Error::InvalidFileName {
            name: filename.to_string(),
        })?;

        let dir = self.project_dir(project);
        ingest_fs::ensure_dir(&dir)?;
        let (path, file) = ingest_fs::create_unique(&dir, name)?;

        let mut file = tokio::fs::File::from_std(file);
        let written = write_stream(reader, &mut file).await;
        drop(file);

        let size = match written {
            Ok(size) => size,
            Err(source) => {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %e, "failed to remove partial file");
                }
                return Err(ingest_fs::Error::Write { path, source }.into());
            }
        };

        let stored_as = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        info!(%project, filename, %stored_as, size, "file saved");

        Ok(SavedFile {
            filename: filename.to_string(),
            stored_as,
            size,
        })
    }

    /// Store each `(filename, reader)` pair directly, without extraction.
    ///
    /// Only a bad project name fails the call; per-file problems are
    /// collected in the report.
    pub async fn save_files<I, R>(&self, project: &str, files: I) -> Result<SaveReport>
    where
        I: IntoIterator<Item = (String, R)>,
        R: AsyncRead + Unpin,
    {
        let project = sanitize_project_name(project)?;
        let mut report = SaveReport::new(project.clone());

        for (filename, mut reader) in files {
            let outcome = self.save_file(&project, &filename, &mut reader).await;
            report.record(&filename, outcome);
        }

        if report.is_clean() {
            info!(%project, saved = report.files.len(), "files saved");
        } else {
            warn!(
                %project,
                saved = report.files.len(),
                failed = report.failed_files.len(),
                "some files were not saved"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn store() -> (tempfile::TempDir, ProjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(
            dir.path().join("projects"),
            StoreOptions {
                staging_dir: Some(dir.path().join("staging")),
                ..Default::default()
            },
        )
        .unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_root() {
        let (_dir, store) = store();
        assert!(store.root().is_dir());
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn list_projects_skips_foreign_entries() {
        let (_dir, store) = store();
        std::fs::create_dir(store.root().join("beta")).unwrap();
        std::fs::create_dir(store.root().join("alpha")).unwrap();
        std::fs::create_dir(store.root().join(".cache")).unwrap();
        std::fs::write(store.root().join("stray.txt"), b"x").unwrap();

        assert_eq!(store.list_projects().unwrap(), ["alpha", "beta"]);
    }

    #[test]
    fn list_files_never_fails() {
        let (_dir, store) = store();
        assert!(store.list_files("missing").is_empty());
        assert!(store.list_files("!!!").is_empty());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (_dir, store) = store();
        std::fs::create_dir(store.root().join("p")).unwrap();

        let err = store.delete_project("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = store.delete_file("p", "ghost.txt").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));

        let err = store.delete_file("nope", "ghost.txt").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[test]
    fn delete_file_refuses_escapes() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.root().join("p/sub")).unwrap();
        std::fs::create_dir(store.root().join("q")).unwrap();
        std::fs::write(store.root().join("q/keep.txt"), b"keep").unwrap();

        for file in ["../q/keep.txt", "..", ".", "sub", ""] {
            let err = store.delete_file("p", file).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{file:?}");
        }
        assert!(store.root().join("q/keep.txt").exists());
        assert!(store.root().join("p/sub").is_dir());
    }

    #[test]
    fn invalid_identifier_is_validation() {
        let (_dir, store) = store();
        let err = store.delete_project("///").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn non_archive_upload_writes_nothing() {
        let (dir, store) = store();
        let mut reader: &[u8] = b"just text";

        let err = store
            .upload_archive("p", "notes.txt", &mut reader)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedUpload { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.list_projects().unwrap().is_empty());
        assert!(!dir.path().join("staging").exists());
    }

    #[tokio::test]
    async fn save_files_flattens_and_allocates() {
        let (_dir, store) = store();
        let files: Vec<(String, &[u8])> = vec![
            ("notes.txt".into(), &b"one"[..]),
            ("nested/notes.txt".into(), &b"two"[..]),
            ("..".into(), &b"bad"[..]),
        ];

        let report = store.save_files("my project", files).await.unwrap();

        assert_eq!(report.project.as_str(), "myproject");
        let stored: Vec<_> = report.files.iter().map(|f| f.stored_as.as_str()).collect();
        assert_eq!(stored, ["notes.txt", "notes_1.txt"]);
        assert_eq!(report.failed_files.len(), 1);
        assert_eq!(report.failed_files[0].filename, "..");
        assert_eq!(store.list_files("myproject"), ["notes.txt", "notes_1.txt"]);
    }
}
