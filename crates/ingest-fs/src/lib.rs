//! Flat-directory filesystem primitives.
//!
//! Every file lands directly inside one directory, so the interesting parts
//! are name handling ([`file_name_of`], [`split_name`]) and collision-free
//! allocation ([`unique_path`], [`create_unique`]).

mod error;
mod name;
pub mod primitives;

pub use error::{Error, Result, from_io};
pub use name::{file_name_of, is_plain_name, split_name};
pub use primitives::{
    Listing, create_unique, ensure_dir, list_names, remove_dir_all, remove_file, unique_path,
};
