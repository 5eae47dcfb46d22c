/// Suffixes that stay whole when a name is split into stem and extension.
const COMPOUND_SUFFIXES: &[&str] = &[".tar.gz"];

/// Split a file name into `(stem, extension)`, the extension keeping its dot.
///
/// `report.pdf` → `("report", ".pdf")`, `bundle.tar.gz` → `("bundle", ".tar.gz")`,
/// `.env` → `(".env", "")`.
pub fn split_name(name: &str) -> (&str, &str) {
    let lower = name.to_ascii_lowercase();
    for suffix in COMPOUND_SUFFIXES {
        if lower.len() > suffix.len() && lower.ends_with(suffix) {
            return name.split_at(name.len() - suffix.len());
        }
    }

    match name.rfind('.') {
        None | Some(0) => (name, ""),
        Some(at) => name.split_at(at),
    }
}

/// Final component of an archive-internal path, or `None` when nothing usable is left.
///
/// Both `/` and `\` separate components, whatever the host platform.
pub fn file_name_of(entry_path: &str) -> Option<&str> {
    let name = entry_path.rsplit(['/', '\\']).next()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return None;
    }
    Some(name)
}

/// Whether `name` can be used as-is as a single entry of a flat directory.
pub fn is_plain_name(name: &str) -> bool {
    file_name_of(name) == Some(name)
}
