use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::name::{is_plain_name, split_name};
use crate::{Error, Result};

fn occupied(path: &Path) -> bool {
    // A dangling symlink still occupies its name.
    std::fs::symlink_metadata(path).is_ok()
}

/// First free path for `name` inside `dir`.
///
/// Returns `dir/name` when it is free, otherwise probes `stem_1.ext`,
/// `stem_2.ext`, ... in order. Only reads the filesystem.
pub fn unique_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let dir = dir.as_ref();
    let candidate = dir.join(name);
    if !occupied(&candidate) {
        return candidate;
    }

    let (stem, ext) = split_name(name);
    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}{ext}"));
        if !occupied(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Allocate a free name in `dir` and create it exclusively.
///
/// A name taken between the probe and the create is allocated again, so two
/// writers never end up sharing one file.
pub fn create_unique(dir: impl AsRef<Path>, name: &str) -> Result<(PathBuf, File)> {
    let dir = dir.as_ref();
    if !is_plain_name(name) {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }

    loop {
        let path = unique_path(dir, name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::Write { path, source: e }),
        }
    }
}
