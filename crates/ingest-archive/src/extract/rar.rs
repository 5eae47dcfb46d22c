use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingEntryKind};
use crate::format::ArchiveFormat;

/// RAR entries through the native unrar library, which only reads from a path.
pub struct RarSource {
    path: PathBuf,
}

impl RarSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

fn unreadable(seen: usize, e: impl ToString) -> Error {
    Error::EntryUnreadable {
        entry: format!("#{seen}"),
        reason: e.to_string(),
    }
}

impl EntrySource for RarSource {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Rar
    }

    fn visit_entries(
        &mut self,
        visit: &mut dyn FnMut(Result<PendingEntry<'_>>) -> ControlFlow<()>,
    ) -> Result<()> {
        let corrupted = |e: unrar::error::UnrarError| Error::Corrupted {
            format: ArchiveFormat::Rar,
            reason: e.to_string(),
        };

        let mut archive = unrar::Archive::new(&self.path)
            .open_for_processing()
            .map_err(corrupted)?;
        let mut seen = 0usize;

        loop {
            let header = match archive.read_header() {
                Ok(Some(header)) => header,
                Ok(None) => break,
                Err(e) if seen == 0 => return Err(corrupted(e)),
                Err(e) => {
                    let _ = visit(Err(unreadable(seen, e)));
                    break;
                }
            };
            seen += 1;

            let original_path = header.entry().filename.to_string_lossy().into_owned();

            if header.entry().is_directory() {
                let flow = visit(Ok(PendingEntry {
                    original_path,
                    size: None,
                    kind: PendingEntryKind::Directory,
                }));
                archive = match header.skip() {
                    Ok(next) => next,
                    Err(e) => {
                        let _ = visit(Err(unreadable(seen, e)));
                        break;
                    }
                };
                if flow.is_break() {
                    break;
                }
                continue;
            }

            // unrar hands out whole entries; the cursor keeps the writer path shared.
            let (data, next) = match header.read() {
                Ok(pair) => pair,
                Err(e) => {
                    let _ = visit(Err(unreadable(seen, e)));
                    break;
                }
            };
            let size = data.len() as u64;
            let mut content = Cursor::new(data);
            let flow = visit(Ok(PendingEntry {
                original_path,
                size: Some(size),
                kind: PendingEntryKind::File(&mut content),
            }));
            archive = next;
            if flow.is_break() {
                break;
            }
        }
        Ok(())
    }
}
