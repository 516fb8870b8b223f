//! Packed KTEX header word
//!
//! The header is a single little-endian `u32` holding six bit fields, least
//! significant first: platform, pixel format, texture type, mip count, flags
//! and fill. Two layouts exist with different field widths:
//!
//! ```text
//!                platform  format  type  mips  flags  fill
//! PreCave            3        3      3     4      1     18
//! PostCave           4        5      4     5      2     12
//! ```
//!
//! The file does not say which layout it uses. [`HeaderLayout::detect`]
//! picks PreCave when bits 14..=31 are all set (the PreCave fill is written
//! as all ones), PostCave otherwise. A PostCave header whose mip, flag and
//! fill bits happen to be all ones is misread as PreCave; that false positive
//! is accepted behaviour and must not be special-cased.

use serde::{Deserialize, Serialize};

use crate::error::{KtexError, Result};

/// Bit-field layout of the packed header word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeaderLayout {
    /// Layout written before the cave update (narrow fields, 18-bit fill)
    PreCave,
    /// Layout written after the cave update (wide fields, 12-bit fill)
    #[default]
    PostCave,
}

/// Field widths in bits, in wire order
#[derive(Debug, Clone, Copy)]
struct FieldWidths {
    platform: u32,
    pixel_format: u32,
    texture_type: u32,
    mip_count: u32,
    flags: u32,
    fill: u32,
}

impl HeaderLayout {
    const fn widths(self) -> FieldWidths {
        match self {
            HeaderLayout::PreCave => FieldWidths {
                platform: 3,
                pixel_format: 3,
                texture_type: 3,
                mip_count: 4,
                flags: 1,
                fill: 18,
            },
            HeaderLayout::PostCave => FieldWidths {
                platform: 4,
                pixel_format: 5,
                texture_type: 4,
                mip_count: 5,
                flags: 2,
                fill: 12,
            },
        }
    }

    /// Guess the layout of a raw header word.
    pub fn detect(raw: u32) -> Self {
        if raw >> 14 == 0x3FFFF {
            HeaderLayout::PreCave
        } else {
            HeaderLayout::PostCave
        }
    }

    /// Largest mip count the layout can store
    pub const fn max_mip_count(self) -> u32 {
        (1 << self.widths().mip_count) - 1
    }

    /// Fill value with every fill bit set
    pub const fn full_fill(self) -> u32 {
        (1 << self.widths().fill) - 1
    }
}

/// Pixel encoding of the mip data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    Dxt1,
    Dxt3,
    #[default]
    Dxt5,
    /// Uncompressed 8-bit RGBA
    Rgba,
    /// Uncompressed 8-bit RGB
    Rgb,
    /// Any value without a codec; kept so headers round-trip
    Other(u8),
}

impl PixelFormat {
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => PixelFormat::Dxt1,
            1 => PixelFormat::Dxt3,
            2 => PixelFormat::Dxt5,
            4 => PixelFormat::Rgba,
            5 => PixelFormat::Rgb,
            other => PixelFormat::Other(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            PixelFormat::Dxt1 => 0,
            PixelFormat::Dxt3 => 1,
            PixelFormat::Dxt5 => 2,
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb => 5,
            PixelFormat::Other(v) => v,
        }
    }
}

/// Target platform recorded in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    Default,
    Ps3,
    Xbox360,
    Pc,
    Other(u8),
}

impl Platform {
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => Platform::Default,
            10 => Platform::Ps3,
            11 => Platform::Xbox360,
            12 => Platform::Pc,
            other => Platform::Other(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            Platform::Default => 0,
            Platform::Ps3 => 10,
            Platform::Xbox360 => 11,
            Platform::Pc => 12,
            Platform::Other(v) => v,
        }
    }
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureType {
    OneD,
    #[default]
    TwoD,
    ThreeD,
    Cube,
    Other(u8),
}

impl TextureType {
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => TextureType::OneD,
            1 => TextureType::TwoD,
            2 => TextureType::ThreeD,
            3 => TextureType::Cube,
            other => TextureType::Other(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            TextureType::OneD => 0,
            TextureType::TwoD => 1,
            TextureType::ThreeD => 2,
            TextureType::Cube => 3,
            TextureType::Other(v) => v,
        }
    }
}

/// Unpacked header fields together with the layout they were read under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KtexHeader {
    pub layout: HeaderLayout,
    pub platform: Platform,
    pub pixel_format: PixelFormat,
    pub texture_type: TextureType,
    pub mip_count: u8,
    pub flags: u8,
    pub fill: u32,
}

impl KtexHeader {
    /// Header with every fill bit set, as the game's tools write it
    pub fn new(
        layout: HeaderLayout,
        platform: Platform,
        pixel_format: PixelFormat,
        texture_type: TextureType,
        mip_count: u8,
    ) -> Self {
        Self {
            layout,
            platform,
            pixel_format,
            texture_type,
            mip_count,
            flags: 0,
            fill: layout.full_fill(),
        }
    }

    /// Unpack a raw header word, choosing the layout with [`HeaderLayout::detect`].
    pub fn from_raw(raw: u32) -> Self {
        Self::from_raw_with(raw, HeaderLayout::detect(raw))
    }

    /// Unpack a raw header word under an explicit layout.
    pub fn from_raw_with(raw: u32, layout: HeaderLayout) -> Self {
        let w = layout.widths();
        let mut shift = 0;
        let mut take = |bits: u32| {
            let value = (raw >> shift) & ((1u64 << bits) - 1) as u32;
            shift += bits;
            value
        };

        let platform = take(w.platform) as u8;
        let pixel_format = take(w.pixel_format) as u8;
        let texture_type = take(w.texture_type) as u8;
        let mip_count = take(w.mip_count) as u8;
        let flags = take(w.flags) as u8;
        let fill = take(w.fill);

        Self {
            layout,
            platform: Platform::from_raw(platform),
            pixel_format: PixelFormat::from_raw(pixel_format),
            texture_type: TextureType::from_raw(texture_type),
            mip_count,
            flags,
            fill,
        }
    }

    /// Pack the fields into a raw header word under `self.layout`.
    ///
    /// Fails if any field is wider than the layout allows.
    pub fn raw(&self) -> Result<u32> {
        let layout = self.layout;
        let w = layout.widths();
        let fields: [(&'static str, u32, u32); 6] = [
            ("platform", self.platform.to_raw() as u32, w.platform),
            ("pixel_format", self.pixel_format.to_raw() as u32, w.pixel_format),
            ("texture_type", self.texture_type.to_raw() as u32, w.texture_type),
            ("mip_count", self.mip_count as u32, w.mip_count),
            ("flags", self.flags as u32, w.flags),
            ("fill", self.fill, w.fill),
        ];

        let mut raw = 0u32;
        let mut shift = 0;
        for (field, value, bits) in fields {
            let max = ((1u64 << bits) - 1) as u32;
            if value > max {
                return Err(KtexError::FieldOverflow {
                    field,
                    value,
                    bits,
                    layout,
                });
            }
            raw |= value << shift;
            shift += bits;
        }

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_cover_32_bits() {
        for layout in [HeaderLayout::PreCave, HeaderLayout::PostCave] {
            let w = layout.widths();
            let total = w.platform + w.pixel_format + w.texture_type + w.mip_count + w.flags + w.fill;
            assert_eq!(total, 32, "{layout:?} must pack into one u32");
        }
    }

    #[test]
    fn test_max_mip_count() {
        assert_eq!(HeaderLayout::PreCave.max_mip_count(), 15);
        assert_eq!(HeaderLayout::PostCave.max_mip_count(), 31);
    }

    #[test]
    fn test_detect_pre_cave_when_high_bits_set() {
        // Bits 14..=31 all ones, low bits arbitrary
        let raw = 0xFFFF_C000 | 0x1234;
        assert_eq!(HeaderLayout::detect(raw), HeaderLayout::PreCave);
        assert_eq!(KtexHeader::from_raw(raw).layout, HeaderLayout::PreCave);
    }

    #[test]
    fn test_detect_post_cave_otherwise() {
        assert_eq!(HeaderLayout::detect(0x7FFF_FFFF), HeaderLayout::PostCave);
        assert_eq!(HeaderLayout::detect(0xFFFF_8000), HeaderLayout::PostCave);
        assert_eq!(HeaderLayout::detect(0), HeaderLayout::PostCave);
    }

    #[test]
    fn test_post_cave_false_positive_is_read_as_pre_cave() {
        // A PostCave header with all mip/flag/fill bits set hits the heuristic.
        let header = KtexHeader {
            layout: HeaderLayout::PostCave,
            platform: Platform::Pc,
            pixel_format: PixelFormat::Dxt5,
            texture_type: TextureType::TwoD,
            mip_count: 31,
            flags: 3,
            fill: 0xFFF,
        };
        let raw = header.raw().unwrap();
        assert_eq!(raw >> 14, 0x3FFFF);
        assert_eq!(KtexHeader::from_raw(raw).layout, HeaderLayout::PreCave);
    }

    #[test]
    fn test_post_cave_pack_unpack() {
        let header = KtexHeader::new(
            HeaderLayout::PostCave,
            Platform::Pc,
            PixelFormat::Dxt5,
            TextureType::TwoD,
            9,
        );
        let raw = header.raw().unwrap();
        // platform 12 | format 2 << 4 | type 1 << 9 | mips 9 << 13 | fill 0xFFF << 20
        assert_eq!(raw, 12 | (2 << 4) | (1 << 9) | (9 << 13) | (0xFFF << 20));
        assert_eq!(KtexHeader::from_raw(raw), header);
    }

    #[test]
    fn test_pre_cave_pack_unpack() {
        let header = KtexHeader::new(
            HeaderLayout::PreCave,
            Platform::Default,
            PixelFormat::Dxt1,
            TextureType::TwoD,
            4,
        );
        let raw = header.raw().unwrap();
        assert_eq!(raw >> 14, 0x3FFFF);
        assert_eq!(KtexHeader::from_raw(raw), header);
    }

    #[test]
    fn test_field_overflow() {
        // Pc (12) needs 4 bits, PreCave only has 3
        let header = KtexHeader::new(
            HeaderLayout::PreCave,
            Platform::Pc,
            PixelFormat::Dxt5,
            TextureType::TwoD,
            1,
        );
        assert!(matches!(
            header.raw(),
            Err(KtexError::FieldOverflow {
                field: "platform",
                bits: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_values_round_trip() {
        assert_eq!(PixelFormat::from_raw(7), PixelFormat::Other(7));
        assert_eq!(PixelFormat::Other(7).to_raw(), 7);
        assert_eq!(Platform::from_raw(3).to_raw(), 3);
        assert_eq!(TextureType::from_raw(9), TextureType::Other(9));
    }
}
