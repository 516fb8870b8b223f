//! DXT block compression
//!
//! DXT5 endpoints are fitted by intel_tex_2 (ISPC kernels). intel_tex_2 has
//! no DXT3 kernel and its BC1 kernel ignores alpha, so DXT1 and DXT3 go
//! through texpresso, whose BC1 path uses the punch-through mode for texels
//! with alpha below 128.

use super::{BLOCK_DIM, BlockFormat};

/// Pad RGBA8 pixels up to whole 4x4 blocks by repeating the last row/column.
fn pad_to_blocks(pixels: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let w = width as usize;
    let h = height as usize;
    let padded_width = w.div_ceil(BLOCK_DIM) * BLOCK_DIM;
    let padded_height = h.div_ceil(BLOCK_DIM) * BLOCK_DIM;

    if w == padded_width && h == padded_height {
        return (pixels.to_vec(), width, height);
    }

    let mut padded = vec![0u8; padded_width * padded_height * 4];
    for y in 0..padded_height {
        for x in 0..padded_width {
            let src_x = x.min(w - 1);
            let src_y = y.min(h - 1);

            let src_idx = (src_y * w + src_x) * 4;
            let dst_idx = (y * padded_width + x) * 4;

            padded[dst_idx..dst_idx + 4].copy_from_slice(&pixels[src_idx..src_idx + 4]);
        }
    }

    (padded, padded_width as u32, padded_height as u32)
}

pub(super) fn texpresso_format(format: BlockFormat) -> texpresso::Format {
    match format {
        BlockFormat::Bc1 => texpresso::Format::Bc1,
        BlockFormat::Bc2 => texpresso::Format::Bc2,
        BlockFormat::Bc3 => texpresso::Format::Bc3,
    }
}

/// Compress tightly packed RGBA8 pixels.
///
/// `width` and `height` must be non-zero. The output holds
/// `format.surface_size(width, height)` bytes in row-major block order.
pub(crate) fn compress(format: BlockFormat, pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let blocks_x = (width as usize).div_ceil(BLOCK_DIM);
    let blocks_y = (height as usize).div_ceil(BLOCK_DIM);
    let mut output = vec![0u8; blocks_x * blocks_y * format.block_size()];

    match format {
        BlockFormat::Bc3 => {
            let (input, padded_width, padded_height) = pad_to_blocks(pixels, width, height);
            let surface = intel_tex_2::RgbaSurface {
                width: padded_width,
                height: padded_height,
                stride: padded_width * 4,
                data: &input,
            };
            intel_tex_2::bc3::compress_blocks_into(&surface, &mut output);
        }
        BlockFormat::Bc1 | BlockFormat::Bc2 => texpresso_format(format).compress(
            pixels,
            width as usize,
            height as usize,
            texpresso::Params::default(),
            &mut output,
        ),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_to_blocks_extends_edges() {
        // 1x1 red pixel grows to a 4x4 red block
        let (padded, w, h) = pad_to_blocks(&[255, 0, 0, 255], 1, 1);
        assert_eq!((w, h), (4, 4));
        assert!(padded.chunks(4).all(|px| px == [255, 0, 0, 255]));
    }

    #[test]
    fn test_pad_to_blocks_noop_when_aligned() {
        let pixels = vec![7u8; 8 * 4 * 4];
        let (padded, w, h) = pad_to_blocks(&pixels, 8, 4);
        assert_eq!((w, h), (8, 4));
        assert_eq!(padded, pixels);
    }

    #[test]
    fn test_output_sizes() {
        let pixels = vec![128u8; 6 * 5 * 4];
        assert_eq!(compress(BlockFormat::Bc1, &pixels, 6, 5).len(), 2 * 2 * 8);
        assert_eq!(compress(BlockFormat::Bc2, &pixels, 6, 5).len(), 2 * 2 * 16);
        assert_eq!(compress(BlockFormat::Bc3, &pixels, 6, 5).len(), 2 * 2 * 16);
    }

    #[test]
    fn test_output_size_matches_texpresso() {
        for format in [BlockFormat::Bc1, BlockFormat::Bc2, BlockFormat::Bc3] {
            assert_eq!(
                texpresso_format(format).compressed_size(9, 3),
                3 * format.block_size()
            );
        }
    }
}
