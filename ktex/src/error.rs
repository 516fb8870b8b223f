//! Error types for KTEX decoding and encoding

use crate::header::HeaderLayout;

/// Errors that can occur when reading or writing KTEX textures
#[derive(Debug, thiserror::Error)]
pub enum KtexError {
    /// Buffer does not start with "KTEX"
    #[error("Invalid magic bytes (expected 'KTEX', found {0:?})")]
    InvalidMagic([u8; 4]),

    /// A read ran past the end of the buffer
    #[error("Unexpected end of buffer at offset {offset} (needed {needed} bytes)")]
    UnexpectedEof { offset: u64, needed: usize },

    /// Pixel format that has no codec
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(u8),

    /// A header field does not fit the layout being written
    #[error("Header field `{field}` value {value} does not fit in {bits} bits of the {layout:?} layout")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        bits: u32,
        layout: HeaderLayout,
    },

    /// Mip level size does not fit the 16-bit wire fields
    #[error("Mip dimensions {width}x{height} exceed the 16-bit wire limit")]
    DimensionTooLarge { width: u32, height: u32 },

    /// Mip data is shorter than its declared dimensions require
    #[error("Mip data is {actual} bytes, expected at least {expected}")]
    TruncatedMip { expected: usize, actual: usize },

    /// Texture has no mip levels to decode
    #[error("Texture contains no mip levels")]
    NoMips,

    /// Zero-sized bitmap handed to the encoder
    #[error("Cannot encode an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },
}

/// Result alias for KTEX operations
pub type Result<T> = std::result::Result<T, KtexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            KtexError::InvalidMagic(*b"ANIM").to_string(),
            "Invalid magic bytes (expected 'KTEX', found [65, 78, 73, 77])"
        );
        assert_eq!(
            KtexError::UnsupportedPixelFormat(7).to_string(),
            "Unsupported pixel format: 7"
        );
        assert_eq!(
            KtexError::UnexpectedEof {
                offset: 8,
                needed: 10
            }
            .to_string(),
            "Unexpected end of buffer at offset 8 (needed 10 bytes)"
        );
    }
}
