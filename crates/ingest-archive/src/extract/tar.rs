use std::io::Read;
use std::ops::ControlFlow;

use tar::EntryType;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingEntryKind};
use crate::format::{ArchiveFormat, Decoder, TarCompress};

pub struct TarSource<R: Read> {
    archive: tar::Archive<Decoder<R>>,
    compress: TarCompress,
}

impl<R: Read> TarSource<R> {
    pub fn new(reader: R, compress: TarCompress) -> Result<Self> {
        let reader = compress.decoder(reader)?;
        Ok(Self {
            archive: tar::Archive::new(reader),
            compress,
        })
    }
}

fn kind_of(entry_type: EntryType) -> Option<&'static str> {
    match entry_type {
        EntryType::Regular | EntryType::Continuous => None,
        EntryType::Symlink => Some("symlink"),
        EntryType::Link => Some("hard link"),
        EntryType::Char | EntryType::Block => Some("device"),
        EntryType::Fifo => Some("fifo"),
        _ => Some("special entry"),
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar(self.compress)
    }

    fn visit_entries(
        &mut self,
        visit: &mut dyn FnMut(Result<PendingEntry<'_>>) -> ControlFlow<()>,
    ) -> Result<()> {
        let format = self.format();
        let corrupted = |e: std::io::Error| Error::Corrupted {
            format,
            reason: e.to_string(),
        };

        let entries = self.archive.entries().map_err(corrupted)?;
        let mut seen = 0usize;

        for entry in entries {
            let mut entry = match entry {
                Ok(entry) => entry,
                // Nothing readable at all: the container itself is bad.
                Err(e) if seen == 0 => return Err(corrupted(e)),
                // A tar stream cannot resynchronise after a bad header.
                Err(e) => {
                    let _ = visit(Err(Error::EntryUnreadable {
                        entry: format!("#{seen}"),
                        reason: e.to_string(),
                    }));
                    break;
                }
            };
            seen += 1;

            let original_path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let size = entry.header().size().ok();
            let entry_type = entry.header().entry_type();

            let kind = if entry_type.is_dir() {
                PendingEntryKind::Directory
            } else if let Some(what) = kind_of(entry_type) {
                PendingEntryKind::Other(what)
            } else {
                PendingEntryKind::File(&mut entry)
            };

            let flow = visit(Ok(PendingEntry {
                original_path,
                size,
                kind,
            }));
            if flow.is_break() {
                break;
            }
        }
        Ok(())
    }
}
