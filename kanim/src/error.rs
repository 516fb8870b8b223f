//! Error and warning types for the animation/build codecs
//!
//! [`FormatError`] aborts the call that raised it. [`DataWarning`] describes a
//! degraded-but-usable result; operations that can produce one return the
//! warnings alongside their output and also log them.

/// Fatal errors: the input violates the wire format or a model invariant
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Buffer does not start with the expected magic
    #[error("Invalid magic bytes (expected {expected:?}, found {found:?})")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },

    /// A read ran past the end of the buffer
    #[error("Unexpected end of buffer at offset {offset} (needed {needed} bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// A length-prefixed string declared a negative length
    #[error("Invalid string length {length} at offset {offset}")]
    InvalidLength { offset: usize, length: i32 },

    /// A name hash with no entry in the trailing dictionary
    #[error("String hash 0x{0:08X} not found in hash dictionary")]
    UnknownHash(u32),

    /// A build frame's vertex count is not a whole number of quads
    #[error("Symbol '{symbol}' frame {frame_num}: vertex count {vert_num} is not a multiple of 6")]
    VertCount {
        symbol: String,
        frame_num: u32,
        vert_num: u32,
    },

    /// A build frame's vertex slice runs past the vertex array
    #[error("Symbol '{symbol}' frame {frame_num}: verts {vert_idx}+{vert_num} exceed {total} verts")]
    VertRange {
        symbol: String,
        frame_num: u32,
        vert_idx: u32,
        vert_num: u32,
        total: usize,
    },

    /// A count does not fit its 32-bit wire field
    #[error("{what} count {count} does not fit in 32 bits")]
    CountOverflow { what: &'static str, count: usize },

    /// Atlas texture could not be decoded or encoded
    #[error("Texture error: {0}")]
    Texture(#[from] ktex::KtexError),

    /// DYN payload is not a readable zip archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error while reading or writing archive entries
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for codec operations
pub type Result<T> = std::result::Result<T, FormatError>;

/// Non-fatal data-consistency problems
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataWarning {
    /// More atlases than the renderer has slots for
    #[error("Build '{build}' references {count} atlases (renderer supports at most {max})")]
    TooManyAtlases {
        build: String,
        count: usize,
        max: usize,
    },

    /// A frame's region does not fit inside its declared size
    #[error(
        "Symbol '{symbol}' frame {frame_num}: region {region_w}x{region_h} at ({offset_x}, {offset_y}) exceeds frame size {frame_w}x{frame_h}"
    )]
    RegionOutOfBounds {
        symbol: String,
        frame_num: u32,
        offset_x: i64,
        offset_y: i64,
        region_w: u32,
        region_h: u32,
        frame_w: u32,
        frame_h: u32,
    },

    /// A frame's quad has zero UV area; it is materialised as a blank canvas
    #[error("Symbol '{symbol}' frame {frame_num}: degenerate atlas region")]
    DegenerateRegion { symbol: String, frame_num: u32 },

    /// A frame had no bitmap when packing; it is written with no verts
    #[error("Symbol '{symbol}' frame {frame_num}: no bitmap to pack")]
    MissingBitmap { symbol: String, frame_num: u32 },

    /// Verts reference an atlas index with no supplied bitmap
    #[error("Symbol '{symbol}' frame {frame_num}: atlas {atlas} not available")]
    MissingAtlas {
        symbol: String,
        frame_num: u32,
        atlas: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FormatError::UnknownHash(0xDEAD_BEEF).to_string(),
            "String hash 0xDEADBEEF not found in hash dictionary"
        );
        assert_eq!(
            FormatError::VertCount {
                symbol: "arm".into(),
                frame_num: 3,
                vert_num: 7
            }
            .to_string(),
            "Symbol 'arm' frame 3: vertex count 7 is not a multiple of 6"
        );
        assert_eq!(
            FormatError::VertRange {
                symbol: "arm".into(),
                frame_num: 0,
                vert_idx: 6,
                vert_num: 6,
                total: 10
            }
            .to_string(),
            "Symbol 'arm' frame 0: verts 6+6 exceed 10 verts"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = DataWarning::TooManyAtlases {
            build: "wilson".into(),
            count: 4,
            max: 3,
        };
        assert_eq!(
            warning.to_string(),
            "Build 'wilson' references 4 atlases (renderer supports at most 3)"
        );
    }
}
