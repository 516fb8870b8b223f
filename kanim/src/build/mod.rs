//! BUILD: symbols, frames and atlas vertex data
//!
//! # Layout (little-endian)
//!
//! ```text
//! "BILD"  i32 version  u32 symbol_count  u32 frame_count
//! str name
//! u32 atlas_count  atlas_count x str atlas_name
//! symbol_count x (ascending symbol_hash)
//!     u32 symbol_hash  u32 frame_count
//!     frame_count x
//!         u32 frame_num  u32 duration  f32 x y w h  u32 vert_idx  u32 vert_num
//! u32 vert_count  vert_count x f32 x y z u v w
//! hash dictionary
//! ```
//!
//! Atlas textures are not embedded; callers load them by name and hand the
//! bitmaps to [`Build::split_atlas`].

mod atlas;
mod parser;
mod types;
mod writer;

pub use parser::decode_build;
pub use types::{Atlas, Build, BuildFrame, BuildSymbol, Vert};
pub use writer::encode_build;

pub const BUILD_MAGIC: &[u8; 4] = b"BILD";

/// Version written by the encoder; other versions decode with a warning
pub const BUILD_VERSION: i32 = 6;

/// Atlas slots the renderer supports
pub const MAX_ATLASES: usize = 3;

pub(crate) const FRAME_RECORD_SIZE: usize = 32;
pub(crate) const VERT_RECORD_SIZE: usize = 24;

/// Verts per sprite quad (two triangles)
pub const VERTS_PER_QUAD: u32 = 6;
