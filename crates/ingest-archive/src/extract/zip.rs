use std::io::{Read, Seek};
use std::ops::ControlFlow;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingEntryKind};
use crate::format::ArchiveFormat;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(|e| Error::Corrupted {
            format: ArchiveFormat::Zip,
            reason: e.to_string(),
        })?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn visit_entries(
        &mut self,
        visit: &mut dyn FnMut(Result<PendingEntry<'_>>) -> ControlFlow<()>,
    ) -> Result<()> {
        // The central directory is already parsed, so a bad entry does not
        // stop the ones after it.
        for index in 0..self.archive.len() {
            let flow = match self.archive.by_index(index) {
                Ok(mut file) => {
                    let original_path = file.name().to_string();
                    let size = file.size();
                    let kind = if file.is_dir() {
                        PendingEntryKind::Directory
                    } else {
                        PendingEntryKind::File(&mut file)
                    };
                    visit(Ok(PendingEntry {
                        original_path,
                        size: Some(size),
                        kind,
                    }))
                }
                Err(e) => visit(Err(Error::EntryUnreadable {
                    entry: format!("#{index}"),
                    reason: e.to_string(),
                })),
            };

            if flow.is_break() {
                break;
            }
        }
        Ok(())
    }
}
