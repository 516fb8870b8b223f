//! DYN containers
//!
//! A DYN file is a zip archive of `.tex` atlas textures, run through a
//! reversible byte shuffle. Plain zips are accepted as well.

mod archive;
mod cipher;

pub use archive::{ArchiveEntry, DynArchive, EntryData};
pub use cipher::{dyn_decode, dyn_encode, is_plain_zip};
