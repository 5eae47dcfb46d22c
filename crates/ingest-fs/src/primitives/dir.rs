use std::fs::FileType;
use std::path::Path;

use crate::error::{self, Error, Result};

/// Which immediate children [`list_names`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listing {
    All,
    Directories,
}

impl Listing {
    fn accepts(self, ty: &FileType) -> bool {
        match self {
            Self::All => true,
            Self::Directories => ty.is_dir(),
        }
    }
}

/// Sorted names of the immediate children of `dir`.
///
/// Names that are not valid UTF-8 are left out since they cannot be
/// addressed through the string-based API above this crate.
pub fn list_names(dir: impl AsRef<Path>, listing: Listing) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(|e| error::from_io(e, dir))? {
        let entry = entry.map_err(|e| error::from_io(e, dir))?;
        let ty = entry.file_type().map_err(|e| error::from_io(e, entry.path()))?;
        if !listing.accepts(&ty) {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::remove_file(path).map_err(|e| removal_error(e, path))
}

pub fn remove_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::remove_dir_all(path).map_err(|e| removal_error(e, path))
}

fn removal_error(err: std::io::Error, path: &Path) -> Error {
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Remove {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_sorted_names() -> Result<()> {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b"), "").unwrap();
        std::fs::write(dir.path().join("a"), "").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        assert_eq!(list_names(dir.path(), Listing::All)?, ["a", "b", "c"]);
        assert_eq!(list_names(dir.path(), Listing::Directories)?, ["c"]);
        Ok(())
    }

    #[test]
    fn listing_missing_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let err = list_names(dir.path().join("missing"), Listing::All).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn removing_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = remove_file(dir.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
    }
}
