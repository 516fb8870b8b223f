//! ANIM: banks of skeletal animations
//!
//! # Layout (little-endian)
//!
//! ```text
//! "ANIM"  i32 version
//! u32 element_count  u32 frame_count  u32 event_count  u32 animation_count
//! animation_count x
//!     str name  u8 facing  u32 bank_hash  f32 frame_rate  u32 frame_count
//!     frame_count x
//!         f32 x y w h
//!         u32 event_count   event_count x u32 event_hash
//!         u32 element_count element_count x
//!             u32 symbol_hash  u32 frame  u32 layer_hash
//!             f32 a b c d tx ty z
//! hash dictionary
//! ```
//!
//! The header counts are totals across every animation. Names referenced by
//! hash are resolved through the trailing dictionary, so decoding first skips
//! over the records to find it.

pub mod facing;
mod parser;
mod types;
mod writer;

pub use parser::decode_anim;
pub use types::{Affine, AnimElement, AnimFrame, Animation, Bank};
pub use writer::{encode_anim, encode_anim_with};

pub const ANIM_MAGIC: &[u8; 4] = b"ANIM";

/// Version written by the encoder; other versions decode with a warning
pub const ANIM_VERSION: i32 = 4;

/// Bytes per element record: three u32 fields and seven f32 fields
pub(crate) const ELEMENT_RECORD_SIZE: usize = 40;
