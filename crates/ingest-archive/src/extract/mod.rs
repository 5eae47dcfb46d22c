//! Single-archive extraction into a flat destination directory.
//!
//! Each codec implements [`EntrySource`]; [`extract_archive`] drives any of
//! them, flattening entry paths to their final component and writing every
//! regular file under a collision-free name.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::ops::ControlFlow;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::options::Budget;
use crate::report::ArchivePass;

#[cfg(feature = "rar")]
mod rar;
mod tar;
mod zip;

#[cfg(feature = "rar")]
pub use rar::RarSource;
pub use tar::TarSource;
pub use zip::ZipSource;

/// An entry read from an archive but not yet written.
pub struct PendingEntry<'r> {
    /// Path as stored in the archive, directories included.
    pub original_path: String,
    /// Declared content length, when the container records one.
    pub size: Option<u64>,
    pub kind: PendingEntryKind<'r>,
}

pub enum PendingEntryKind<'r> {
    File(&'r mut dyn Read),
    Directory,
    /// Links, devices and other entries without content of their own.
    Other(&'static str),
}

/// Archive-specific entry source.
pub trait EntrySource {
    fn format(&self) -> ArchiveFormat;

    /// Feed every entry to `visit` in archive order until the archive ends or
    /// `visit` breaks.
    ///
    /// A container that cannot be read at all is an `Err`; a single unreadable
    /// entry is handed to `visit` so the caller can decide whether to go on.
    fn visit_entries(
        &mut self,
        visit: &mut dyn FnMut(Result<PendingEntry<'_>>) -> ControlFlow<()>,
    ) -> Result<()>;
}

/// Open `path` with the entry source matching `format`.
pub fn open_source(path: &Path, format: ArchiveFormat) -> Result<Box<dyn EntrySource>> {
    match format {
        ArchiveFormat::Zip => Ok(Box::new(ZipSource::new(open_file(path)?)?)),
        ArchiveFormat::Tar(compress) => Ok(Box::new(TarSource::new(open_file(path)?, compress)?)),
        #[cfg(feature = "rar")]
        ArchiveFormat::Rar => Ok(Box::new(RarSource::new(path))),
        #[cfg(not(feature = "rar"))]
        ArchiveFormat::Rar => Err(Error::CodecUnavailable { format }),
    }
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| ingest_fs::from_io(e, path))?;
    Ok(BufReader::new(file))
}

/// Extract one archive into `destination`.
///
/// Never fails as a whole: an unreadable container yields a pass with a
/// single issue and nothing extracted, and a bad entry is recorded and
/// skipped. `label` names the archive in issues (the upload's original name
/// for the root, the stored name for nested archives).
pub fn extract_archive(
    archive: &Path,
    label: &str,
    format: ArchiveFormat,
    destination: &Path,
    budget: &mut Budget,
) -> ArchivePass {
    let mut pass = ArchivePass::default();

    let mut source = match open_source(archive, format) {
        Ok(source) => source,
        Err(e) => {
            pass.record(label, None, e);
            return pass;
        }
    };

    let outcome = source.visit_entries(&mut |entry| match entry {
        Ok(entry) => extract_entry(entry, label, destination, budget, &mut pass),
        Err(e) => {
            pass.record(label, None, e);
            ControlFlow::Continue(())
        }
    });

    if let Err(e) = outcome {
        pass.record(label, None, e);
    }

    debug!(
        archive = label,
        format = %source.format(),
        extracted = pass.extracted.len(),
        issues = pass.issues.len(),
        "archive pass finished"
    );
    pass
}

fn extract_entry(
    entry: PendingEntry<'_>,
    label: &str,
    destination: &Path,
    budget: &mut Budget,
    pass: &mut ArchivePass,
) -> ControlFlow<()> {
    let PendingEntry {
        original_path,
        size,
        kind,
    } = entry;

    let reader = match kind {
        PendingEntryKind::File(reader) => reader,
        PendingEntryKind::Directory => return ControlFlow::Continue(()),
        PendingEntryKind::Other(what) => {
            debug!(archive = label, entry = %original_path, what, "skipping entry without content");
            return ControlFlow::Continue(());
        }
    };

    let Some(name) = ingest_fs::file_name_of(&original_path) else {
        debug!(archive = label, entry = %original_path, "skipping entry with empty name");
        return ControlFlow::Continue(());
    };

    if let Err(e) = budget.take_entry() {
        pass.record(label, Some(&original_path), e);
        return ControlFlow::Break(());
    }

    match write_entry(reader, name, size, destination, budget) {
        Ok((stored, written)) => {
            debug!(archive = label, entry = %original_path, stored = %stored, written, "extracted");
            pass.extracted.push(stored);
            pass.bytes_written += written;
            ControlFlow::Continue(())
        }
        Err(e) => {
            pass.record(label, Some(&original_path), e);
            if pass.stopped {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }
}

/// Write one entry under a fresh name; on failure nothing is left behind.
fn write_entry(
    reader: &mut dyn Read,
    name: &str,
    declared: Option<u64>,
    destination: &Path,
    budget: &mut Budget,
) -> Result<(String, u64)> {
    let (path, file) = ingest_fs::create_unique(destination, name)?;

    let written = copy_entry(reader, &path, file, declared, budget);
    match written {
        Ok(written) => {
            let stored = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string());
            Ok((stored, written))
        }
        Err(e) => {
            if let Err(cleanup) = ingest_fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove partial file");
            }
            Err(e)
        }
    }
}

fn copy_entry(
    reader: &mut dyn Read,
    path: &Path,
    file: File,
    declared: Option<u64>,
    budget: &mut Budget,
) -> Result<u64> {
    let mut writer = BufWriter::new(file);
    let failed = |source: io::Error| Error::ExtractionFailed {
        path: path.to_path_buf(),
        source,
    };

    // One byte past the allowance is enough to tell "at the limit" from "over it".
    let copied = match budget.bytes_left() {
        Some(left) => io::copy(&mut (&mut *reader).take(left.saturating_add(1)), &mut writer),
        None => io::copy(reader, &mut writer),
    }
    .map_err(failed)?;
    writer.flush().map_err(failed)?;

    budget.spend_bytes(copied)?;

    if let Some(expected) = declared {
        if copied < expected {
            return Err(Error::Truncated {
                expected,
                actual: copied,
            });
        }
    }
    Ok(copied)
}
