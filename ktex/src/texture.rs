//! KTEX container: header, mip chain and premultiply flag
//!
//! # Layout
//! ```text
//! 0x00: magic "KTEX"
//! 0x04: header u32 (packed, see `header`)
//! 0x08: per mip (10 bytes each):
//!         width u16, height u16, pitch u16, data_size u32
//! ....: mip data, concatenated in chain order
//! ....: optional premultiply flag u8 (present only when it is the very last byte)
//! ```

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::dxt;
use crate::error::{KtexError, Result};
use crate::header::{KtexHeader, PixelFormat};
use crate::options::TextureOptions;

/// KTEX magic bytes
pub const KTEX_MAGIC: &[u8; 4] = b"KTEX";

/// Size of one mip description in the mip table
pub const MIP_ENTRY_SIZE: usize = 10;

/// One level of the mip chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mip {
    pub width: u16,
    pub height: u16,
    pub pitch: u16,
    /// Encoded pixel data, bottom row first
    pub data: Vec<u8>,
}

/// Decoded KTEX texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ktex {
    pub header: KtexHeader,
    pub mips: Vec<Mip>,
    /// `None` when the file carries no flag byte
    pub premultiplied: Option<bool>,
}

impl Ktex {
    /// Parse a KTEX buffer.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        read_le(&mut cursor, 4, |c| c.read_exact(&mut magic))?;
        if &magic != KTEX_MAGIC {
            return Err(KtexError::InvalidMagic(magic));
        }

        let header = KtexHeader::from_raw(read_le(&mut cursor, 4, |c| {
            c.read_u32::<LittleEndian>()
        })?);

        let mut entries = Vec::with_capacity(header.mip_count as usize);
        for _ in 0..header.mip_count {
            let width = read_le(&mut cursor, 2, |c| c.read_u16::<LittleEndian>())?;
            let height = read_le(&mut cursor, 2, |c| c.read_u16::<LittleEndian>())?;
            let pitch = read_le(&mut cursor, 2, |c| c.read_u16::<LittleEndian>())?;
            let data_size = read_le(&mut cursor, 4, |c| c.read_u32::<LittleEndian>())?;
            entries.push((width, height, pitch, data_size as usize));
        }

        let mut mips = Vec::with_capacity(entries.len());
        for (width, height, pitch, data_size) in entries {
            let remaining = data.len().saturating_sub(cursor.position() as usize);
            if remaining < data_size {
                return Err(KtexError::UnexpectedEof {
                    offset: cursor.position(),
                    needed: data_size,
                });
            }
            let mut mip_data = vec![0u8; data_size];
            read_le(&mut cursor, data_size, |c| c.read_exact(&mut mip_data))?;
            mips.push(Mip {
                width,
                height,
                pitch,
                data: mip_data,
            });
        }

        let remaining = data.len() - cursor.position() as usize;
        let premultiplied = match remaining {
            0 => None,
            1 => Some(read_le(&mut cursor, 1, |c| c.read_u8())? != 0),
            extra => {
                tracing::warn!("Ignoring {} trailing bytes after KTEX mip data", extra);
                None
            }
        };

        tracing::debug!(
            "Decoded KTEX {:?} {:?}, {} mips, premultiplied {:?}",
            header.layout,
            header.pixel_format,
            mips.len(),
            premultiplied
        );

        Ok(Self {
            header,
            mips,
            premultiplied,
        })
    }

    /// Serialize to a KTEX buffer.
    ///
    /// The mip count written is the length of `self.mips`, whatever
    /// `self.header.mip_count` says.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let header = KtexHeader {
            mip_count: u8::try_from(self.mips.len()).unwrap_or(u8::MAX),
            ..self.header
        };
        let raw = header.raw()?;

        let data_len: usize = self.mips.iter().map(|m| m.data.len()).sum();
        let mut output =
            Vec::with_capacity(8 + self.mips.len() * MIP_ENTRY_SIZE + data_len + 1);

        output.extend_from_slice(KTEX_MAGIC);
        output.extend_from_slice(&raw.to_le_bytes());

        for mip in &self.mips {
            output.extend_from_slice(&mip.width.to_le_bytes());
            output.extend_from_slice(&mip.height.to_le_bytes());
            output.extend_from_slice(&mip.pitch.to_le_bytes());
            output.extend_from_slice(&(mip.data.len() as u32).to_le_bytes());
        }

        for mip in &self.mips {
            output.extend_from_slice(&mip.data);
        }

        if let Some(flag) = self.premultiplied {
            output.push(flag as u8);
        }

        Ok(output)
    }

    /// Build a texture from a straight-alpha, top-down bitmap with default options.
    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        Self::from_image_with(image, &TextureOptions::default())
    }

    /// Build a texture from a straight-alpha, top-down bitmap.
    ///
    /// Premultiplies (if enabled), flips to bottom-up, then halves each axis
    /// (floored, clamped to 1) until both reach 1 or the layout's mip field is
    /// full. Every level is encoded in `options.pixel_format`.
    pub fn from_image_with(image: &RgbaImage, options: &TextureOptions) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(KtexError::EmptyImage { width, height });
        }
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(KtexError::DimensionTooLarge { width, height });
        }

        let mut base = image.clone();
        if options.premultiply {
            premultiply_alpha(&mut base);
        }
        imageops::flip_vertical_in_place(&mut base);

        let max_mips = options.layout.max_mip_count() as usize;
        let mut levels = vec![base];
        while options.generate_mips && levels.len() < max_mips {
            let next = {
                let last = &levels[levels.len() - 1];
                let (w, h) = last.dimensions();
                if w == 1 && h == 1 {
                    break;
                }
                imageops::resize(last, (w / 2).max(1), (h / 2).max(1), FilterType::Triangle)
            };
            levels.push(next);
        }

        let mips = levels
            .iter()
            .map(|level| encode_mip(level, options.pixel_format))
            .collect::<Result<Vec<_>>>()?;

        let header = KtexHeader::new(
            options.layout,
            options.platform,
            options.pixel_format,
            options.texture_type,
            mips.len() as u8,
        );

        Ok(Self {
            header,
            mips,
            premultiplied: Some(options.premultiply),
        })
    }

    /// Decode mip 0 to a straight-alpha, top-down bitmap with default options.
    pub fn to_image(&self) -> Result<RgbaImage> {
        self.to_image_with(&TextureOptions::default())
    }

    /// Decode mip 0 to a top-down bitmap.
    ///
    /// Alpha is un-premultiplied when the stored flag says so, or, for files
    /// without a flag, when `options.assume_premultiplied` is set.
    pub fn to_image_with(&self, options: &TextureOptions) -> Result<RgbaImage> {
        let mip = self.mips.first().ok_or(KtexError::NoMips)?;
        let (width, height) = (mip.width as u32, mip.height as u32);

        let rgba = dxt::decode_pixels(self.header.pixel_format, &mip.data, width, height)?;
        let actual = rgba.len();
        let mut image = RgbaImage::from_raw(width, height, rgba).ok_or(KtexError::TruncatedMip {
            expected: width as usize * height as usize * 4,
            actual,
        })?;

        if self.premultiplied.unwrap_or(options.assume_premultiplied) {
            unpremultiply_alpha(&mut image);
        }
        imageops::flip_vertical_in_place(&mut image);

        Ok(image)
    }

    /// Width of mip 0
    pub fn width(&self) -> u32 {
        self.mips.first().map_or(0, |m| m.width as u32)
    }

    /// Height of mip 0
    pub fn height(&self) -> u32 {
        self.mips.first().map_or(0, |m| m.height as u32)
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.header.pixel_format
    }
}

/// Run one read, reporting a short buffer at the offset the read started from
fn read_le<T>(
    cursor: &mut Cursor<&[u8]>,
    needed: usize,
    read: impl FnOnce(&mut Cursor<&[u8]>) -> io::Result<T>,
) -> Result<T> {
    let offset = cursor.position();
    read(cursor).map_err(|_| KtexError::UnexpectedEof { offset, needed })
}

fn encode_mip(level: &RgbaImage, format: PixelFormat) -> Result<Mip> {
    let (width, height) = level.dimensions();
    let pitch = dxt::pitch(format, width)?;
    let data = dxt::encode_pixels(format, level.as_raw(), width, height)?;

    Ok(Mip {
        width: width as u16,
        height: height as u16,
        pitch: u16::try_from(pitch)
            .map_err(|_| KtexError::DimensionTooLarge { width, height })?,
        data,
    })
}

/// Scale RGB by alpha in place
pub fn premultiply_alpha(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel[3] as u32;
        for c in &mut pixel.0[..3] {
            *c = ((*c as u32 * a + 127) / 255) as u8;
        }
    }
}

/// Divide RGB by alpha in place (rounded up, clamped to 255); alpha 0 is left as is
pub fn unpremultiply_alpha(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel[3] as u32;
        if a == 0 {
            continue;
        }
        for c in &mut pixel.0[..3] {
            *c = ((*c as u32 * 255).div_ceil(a)).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderLayout;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128, 255])
        })
    }

    #[test]
    fn test_decode_invalid_magic() {
        let result = Ktex::decode(b"KTXE\0\0\0\0");
        assert!(matches!(result, Err(KtexError::InvalidMagic(m)) if &m == b"KTXE"));
    }

    #[test]
    fn test_decode_truncated_mip_table() {
        let header = KtexHeader::new(
            HeaderLayout::PostCave,
            crate::Platform::Pc,
            PixelFormat::Rgba,
            crate::TextureType::TwoD,
            1,
        );
        let mut data = KTEX_MAGIC.to_vec();
        data.extend_from_slice(&header.raw().unwrap().to_le_bytes());
        data.extend_from_slice(&[1, 0, 1, 0]);
        assert!(matches!(
            Ktex::decode(&data),
            Err(KtexError::UnexpectedEof { offset: 12, .. })
        ));
    }

    #[test]
    fn test_dxt1_transparent_texels_stay_transparent() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Dxt1,
            generate_mips: false,
            ..Default::default()
        };
        let source = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            }
        });
        let tex = Ktex::from_image_with(&source, &options).unwrap();
        let image = tex.to_image_with(&options).unwrap();
        assert_eq!(image.get_pixel(0, 0)[3], 0, "transparent texel came back opaque");
        assert_eq!(image.get_pixel(7, 7)[3], 255);
    }

    #[test]
    fn test_decode_truncated_mip_data() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Rgba,
            generate_mips: false,
            ..Default::default()
        };
        let bytes = Ktex::from_image_with(&gradient(2, 2), &options)
            .unwrap()
            .encode()
            .unwrap();
        // Drop the flag byte and half of the 16 data bytes
        let cut = &bytes[..bytes.len() - 9];
        assert!(matches!(
            Ktex::decode(cut),
            Err(KtexError::UnexpectedEof {
                offset: 18,
                needed: 16
            })
        ));
    }

    #[test]
    fn test_premultiply_flag_presence() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Rgba,
            generate_mips: false,
            ..Default::default()
        };
        let mut tex = Ktex::from_image_with(&gradient(4, 4), &options).unwrap();

        let with_flag = tex.encode().unwrap();
        assert_eq!(*with_flag.last().unwrap(), 1);
        assert_eq!(Ktex::decode(&with_flag).unwrap().premultiplied, Some(true));

        tex.premultiplied = None;
        let without_flag = tex.encode().unwrap();
        assert_eq!(without_flag.len(), with_flag.len() - 1);
        assert_eq!(Ktex::decode(&without_flag).unwrap().premultiplied, None);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let tex = Ktex::from_image(&gradient(16, 8)).unwrap();
        let bytes = tex.encode().unwrap();
        assert_eq!(&bytes[..4], KTEX_MAGIC);
        assert_eq!(Ktex::decode(&bytes).unwrap(), tex);
    }

    #[test]
    fn test_mip_chain_non_square() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Rgba,
            ..Default::default()
        };
        let tex = Ktex::from_image_with(&gradient(8, 2), &options).unwrap();
        let dims: Vec<(u16, u16)> = tex.mips.iter().map(|m| (m.width, m.height)).collect();
        assert_eq!(dims, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert_eq!(tex.header.mip_count, 4);
    }

    #[test]
    fn test_mip_chain_capped_by_layout() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Rgba,
            layout: HeaderLayout::PreCave,
            platform: crate::Platform::Default,
            ..Default::default()
        };
        // 32768 tall would need 16 levels; PreCave stores at most 15
        let tex = Ktex::from_image_with(&RgbaImage::new(1, 1 << 15), &options).unwrap();
        assert_eq!(tex.mips.len(), 15);
        assert_eq!(tex.mips[0].pitch, 4);
        assert_eq!(tex.mips[14].height, 2);
    }

    #[test]
    fn test_raw_rgba_round_trip_is_exact_for_opaque() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Rgba,
            ..Default::default()
        };
        let source = gradient(5, 3);
        let tex = Ktex::from_image_with(&source, &options).unwrap();
        assert_eq!(tex.mips[0].pitch, 20);
        assert_eq!(tex.to_image().unwrap(), source);
    }

    #[test]
    fn test_vertical_flip_on_wire() {
        let options = TextureOptions {
            pixel_format: PixelFormat::Rgba,
            premultiply: false,
            generate_mips: false,
            ..Default::default()
        };
        let mut source = RgbaImage::new(1, 2);
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let tex = Ktex::from_image_with(&source, &options).unwrap();
        // Bottom row is stored first
        assert_eq!(&tex.mips[0].data[..4], &[0, 0, 255, 255]);
        assert_eq!(tex.to_image_with(&options).unwrap(), source);
    }

    #[test]
    fn test_unpremultiply_rounds_up_and_clamps() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([50, 100, 128, 128]));
        unpremultiply_alpha(&mut image);
        // 50*255/128 = 99.6 -> 100, 100*255/128 = 199.2 -> 200, 128*255/128 = 255
        assert_eq!(image.get_pixel(0, 0).0, [100, 200, 255, 128]);

        let mut transparent = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        unpremultiply_alpha(&mut transparent);
        assert_eq!(transparent.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_to_image_without_mips() {
        let tex = Ktex {
            header: KtexHeader::from_raw(0),
            mips: Vec::new(),
            premultiplied: None,
        };
        assert!(matches!(tex.to_image(), Err(KtexError::NoMips)));
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            Ktex::from_image(&RgbaImage::new(0, 4)),
            Err(KtexError::EmptyImage { .. })
        ));
    }
}
