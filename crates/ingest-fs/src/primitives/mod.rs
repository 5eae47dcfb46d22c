mod dir;
mod unique;

pub use dir::{Listing, ensure_dir, list_names, remove_dir_all, remove_file};
pub use unique::{create_unique, unique_path};
