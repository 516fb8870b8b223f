//! kanim: sprite-animation asset codecs
//!
//! Converts between in-memory models and the binary formats of a 2D
//! skeletal animation pipeline:
//!
//! - **ANIM** ([`anim`]): banks of animations, each a sequence of frames
//!   placing transformed symbol instances.
//! - **BUILD** ([`build`]): named symbols whose frames point at quads in a
//!   packed texture atlas, plus atlas split/pack.
//! - **DYN** ([`container`]): obfuscated zip archives of KTEX atlases.
//!
//! Textures themselves are handled by the [`ktex`] crate, re-exported here.
//!
//! # Usage
//!
//! ```ignore
//! use kanim::{decode_build, encode_build, DynArchive};
//!
//! let mut build = decode_build(&std::fs::read("build.bin")?)?;
//! let archive = DynArchive::from_bytes(&std::fs::read("wilson.dyn")?)?;
//! for (atlas, (_, tex)) in build.atlases.iter_mut().zip(archive.textures()) {
//!     atlas.ktex = Some(tex.clone());
//! }
//! for warning in build.split_loaded_atlases()? {
//!     eprintln!("{warning}");
//! }
//! // ... edit frame bitmaps ...
//! build.pack_atlas()?;
//! std::fs::write("build.bin", encode_build(&build)?)?;
//! ```
//!
//! Every call is a pure function of its input; nothing is cached between
//! calls. Fatal problems are [`FormatError`]s. Recoverable ones are
//! returned as [`DataWarning`]s and logged through `tracing`.

pub mod anim;
pub mod atlas;
pub mod build;
mod config;
pub mod container;
mod cursor;
mod error;
mod hash;

pub use ktex;

pub use anim::{
    ANIM_VERSION, Affine, AnimElement, AnimFrame, Animation, Bank, decode_anim, encode_anim,
    encode_anim_with,
};
pub use atlas::{AtlasPacker, Rect, Regions};
pub use build::{
    Atlas, BUILD_VERSION, Build, BuildFrame, BuildSymbol, Vert, decode_build, encode_build,
};
pub use config::{
    AnimOptions, AtlasOptions, CodecConfig, DEFAULT_ALIGNMENT, DEFAULT_ATLAS_NAME,
    DEFAULT_EXPORT_DEPTH, DEFAULT_MIN_BLOCK_SIZE, ResizeFilter, TextureOptions,
};
pub use container::{DynArchive, dyn_decode, dyn_encode};
pub use cursor::{ByteCursor, ByteWriter};
pub use error::{DataWarning, FormatError, Result};
pub use hash::{HashTable, strhash};
