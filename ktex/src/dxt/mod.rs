//! Pixel codecs for mip data
//!
//! Block compression lives in `encode`; decompression of all three DXT
//! formats is texpresso's. The functions here dispatch on [`PixelFormat`]
//! and also cover the raw RGBA/RGB passthrough formats.

mod encode;

use crate::error::{KtexError, Result};
use crate::header::PixelFormat;

/// Texels per block edge
pub(crate) const BLOCK_DIM: usize = 4;

/// Block-compressed encodings (BC1 = DXT1, BC2 = DXT3, BC3 = DXT5)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockFormat {
    Bc1,
    Bc2,
    Bc3,
}

impl BlockFormat {
    pub(crate) const fn block_size(self) -> usize {
        match self {
            BlockFormat::Bc1 => 8,
            BlockFormat::Bc2 | BlockFormat::Bc3 => 16,
        }
    }
}

/// How a pixel format stores its texels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Block(BlockFormat),
    Raw { bytes_per_pixel: usize },
}

fn storage(format: PixelFormat) -> Result<Storage> {
    match format {
        PixelFormat::Dxt1 => Ok(Storage::Block(BlockFormat::Bc1)),
        PixelFormat::Dxt3 => Ok(Storage::Block(BlockFormat::Bc2)),
        PixelFormat::Dxt5 => Ok(Storage::Block(BlockFormat::Bc3)),
        PixelFormat::Rgba => Ok(Storage::Raw { bytes_per_pixel: 4 }),
        PixelFormat::Rgb => Ok(Storage::Raw { bytes_per_pixel: 3 }),
        PixelFormat::Other(v) => Err(KtexError::UnsupportedPixelFormat(v)),
    }
}

/// Bytes per row of blocks (compressed) or row of pixels (raw)
pub fn pitch(format: PixelFormat, width: u32) -> Result<usize> {
    Ok(match storage(format)? {
        Storage::Block(block) => (width as usize).div_ceil(BLOCK_DIM).max(1) * block.block_size(),
        Storage::Raw { bytes_per_pixel } => width as usize * bytes_per_pixel,
    })
}

/// Total encoded size of a `width` x `height` surface
pub fn surface_size(format: PixelFormat, width: u32, height: u32) -> Result<usize> {
    let rows = match storage(format)? {
        Storage::Block(_) => (height as usize).div_ceil(BLOCK_DIM).max(1),
        Storage::Raw { .. } => height as usize,
    };
    Ok(pitch(format, width)? * rows)
}

/// Encode tightly packed RGBA8 pixels into `format`.
pub fn encode_pixels(format: PixelFormat, rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    match storage(format)? {
        Storage::Block(block) => Ok(encode::compress(block, rgba, width, height)),
        Storage::Raw { bytes_per_pixel: 4 } => Ok(rgba.to_vec()),
        Storage::Raw { .. } => Ok(rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()),
    }
}

/// Decode `format` data into tightly packed RGBA8 pixels.
pub fn decode_pixels(format: PixelFormat, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = surface_size(format, width, height)?;
    if data.len() < expected {
        return Err(KtexError::TruncatedMip {
            expected,
            actual: data.len(),
        });
    }

    match storage(format)? {
        Storage::Block(block) => {
            let mut rgba = vec![0u8; width as usize * height as usize * 4];
            encode::texpresso_format(block).decompress(
                &data[..expected],
                width as usize,
                height as usize,
                &mut rgba,
            );
            Ok(rgba)
        }
        Storage::Raw { bytes_per_pixel: 4 } => Ok(data[..expected].to_vec()),
        Storage::Raw { .. } => Ok(data[..expected]
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()),
    }
}
