use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bounds on a single upload's expansion. Everything is unbounded by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Archives expanded per run, the upload itself included.
    pub max_archives: Option<usize>,
    /// Files written per run, across every nesting level.
    pub max_entries: Option<u64>,
    /// Bytes written per run, across every nesting level.
    pub max_total_bytes: Option<u64>,
}

impl ExtractOptions {
    pub fn max_archives(mut self, n: usize) -> Self {
        self.max_archives = Some(n);
        self
    }

    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = Some(n);
        self
    }

    pub fn max_total_bytes(mut self, bytes: u64) -> Self {
        self.max_total_bytes = Some(bytes);
        self
    }

    pub fn budget(&self) -> Budget {
        Budget {
            max_entries: self.max_entries,
            max_bytes: self.max_total_bytes,
            entries: 0,
            bytes: 0,
        }
    }
}

/// Running tally of what a run has written, checked against the limits.
#[derive(Clone, Copy, Debug)]
pub struct Budget {
    max_entries: Option<u64>,
    max_bytes: Option<u64>,
    entries: u64,
    bytes: u64,
}

impl Budget {
    pub fn unlimited() -> Self {
        ExtractOptions::default().budget()
    }

    /// Reserve one more entry.
    pub fn take_entry(&mut self) -> Result<()> {
        if let Some(max) = self.max_entries {
            if self.entries >= max {
                return Err(Error::LimitExceeded {
                    limit: "entry",
                    max,
                });
            }
        }
        self.entries += 1;
        Ok(())
    }

    /// Bytes still allowed, if bounded.
    pub fn bytes_left(&self) -> Option<u64> {
        self.max_bytes.map(|max| max.saturating_sub(self.bytes))
    }

    pub fn spend_bytes(&mut self, n: u64) -> Result<()> {
        self.bytes += n;
        match self.max_bytes {
            Some(max) if self.bytes > max => Err(Error::LimitExceeded { limit: "byte", max }),
            _ => Ok(()),
        }
    }
}
