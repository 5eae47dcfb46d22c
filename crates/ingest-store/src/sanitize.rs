use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A project identifier made only of `[A-Za-z0-9_-]`.
///
/// The only way to build one is [`sanitize_project_name`], so holding a
/// `ProjectName` means the string is safe to use as a directory name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectName(String);

fn allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Drop every character outside `[A-Za-z0-9_-]`.
///
/// Characters are removed, not replaced: `"my project!"` becomes `"myproject"`.
pub fn sanitize_project_name(raw: &str) -> Result<ProjectName> {
    let name: String = raw.chars().filter(|&c| allowed(c)).collect();
    if name.is_empty() {
        return Err(Error::InvalidIdentifier {
            name: raw.to_string(),
        });
    }
    Ok(ProjectName(name))
}

impl ProjectName {
    /// Whether `name` is already a sanitized project name.
    pub fn is_valid(name: &str) -> bool {
        !name.is_empty() && name.chars().all(allowed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
