//! ktex: KTEX texture container codec
//!
//! Reads and writes the KTEX texture container used by the sprite-animation
//! asset pipeline: a packed header word, a mip table, DXT1/3/5 (or raw
//! RGBA/RGB) mip data and an optional premultiplied-alpha flag byte.
//!
//! # Usage
//!
//! ```ignore
//! use ktex::Ktex;
//!
//! let tex = Ktex::decode(&std::fs::read("atlas-0.tex")?)?;
//! let bitmap = tex.to_image()?;               // top-down, straight alpha
//! let rebuilt = Ktex::from_image(&bitmap)?;   // DXT5, full mip chain
//! std::fs::write("atlas-0.tex", rebuilt.encode()?)?;
//! ```
//!
//! # Header layouts
//!
//! Two bit layouts of the header word exist in the wild; see [`header`] for
//! the field widths and the heuristic that tells them apart.

mod dxt;
mod error;
pub mod header;
mod options;
mod texture;

pub use dxt::{decode_pixels, encode_pixels, pitch, surface_size};
pub use error::{KtexError, Result};
pub use header::{HeaderLayout, KtexHeader, PixelFormat, Platform, TextureType};
pub use options::TextureOptions;
pub use texture::{KTEX_MAGIC, Ktex, MIP_ENTRY_SIZE, Mip, premultiply_alpha, unpremultiply_alpha};
