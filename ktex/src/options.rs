//! Encoder/decoder options for KTEX textures

use serde::{Deserialize, Serialize};

use crate::header::{HeaderLayout, PixelFormat, Platform, TextureType};

/// Options for [`Ktex::from_image_with`](crate::Ktex::from_image_with) and
/// [`Ktex::to_image_with`](crate::Ktex::to_image_with)
///
/// Deserializes from a table such as:
///
/// ```toml
/// pixel_format = "Dxt5"
/// platform = "Pc"
/// layout = "PostCave"
/// premultiply = true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureOptions {
    pub pixel_format: PixelFormat,
    pub platform: Platform,
    pub texture_type: TextureType,
    pub layout: HeaderLayout,
    /// Premultiply RGB by alpha before compressing and store the flag byte
    pub premultiply: bool,
    /// Build the full mip chain; when false only mip 0 is written
    pub generate_mips: bool,
    /// How to treat a texture whose file carries no premultiply flag
    pub assume_premultiplied: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Dxt5,
            platform: Platform::Pc,
            texture_type: TextureType::TwoD,
            layout: HeaderLayout::PostCave,
            premultiply: true,
            generate_mips: true,
            assume_premultiplied: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TextureOptions::default();
        assert_eq!(options.pixel_format, PixelFormat::Dxt5);
        assert_eq!(options.layout, HeaderLayout::PostCave);
        assert!(options.premultiply);
        assert!(options.generate_mips);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options: TextureOptions = toml::from_str(
            r#"
            pixel_format = "Dxt1"
            generate_mips = false
            "#,
        )
        .unwrap();
        assert_eq!(options.pixel_format, PixelFormat::Dxt1);
        assert!(!options.generate_mips);
        assert_eq!(options.platform, Platform::Pc);
        assert!(options.premultiply);
    }
}
