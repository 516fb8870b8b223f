//! Codec configuration
//!
//! Every option defaults to the value the asset tools themselves use, so an
//! empty TOML document yields [`CodecConfig::default`]:
//!
//! ```toml
//! [anim]
//! export_depth = 10.0
//!
//! [atlas]
//! alignment = 4
//! min_block_size = 8
//! atlas_name = "atlas-0.tex"
//! resize_filter = "Triangle"
//!
//! [texture]
//! pixel_format = "Dxt5"
//! ```

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

pub use ktex::TextureOptions;

/// Default z range used when renormalising element draw order on encode
pub const DEFAULT_EXPORT_DEPTH: f32 = 10.0;

/// Default packer placement step in pixels
pub const DEFAULT_ALIGNMENT: u32 = 4;

/// Default smallest quad-tree cell the region analyzer will split into
pub const DEFAULT_MIN_BLOCK_SIZE: u32 = 8;

/// Default name given to a freshly packed atlas
pub const DEFAULT_ATLAS_NAME: &str = "atlas-0.tex";

/// Top-level configuration for every codec entry point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub anim: AnimOptions,
    #[serde(default)]
    pub atlas: AtlasOptions,
    #[serde(default)]
    pub texture: TextureOptions,
}

impl CodecConfig {
    /// Parse a configuration document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

/// ANIM encoder options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimOptions {
    /// Elements are written with `z = k / count * depth - depth * 10`
    #[serde(default = "default_export_depth")]
    pub export_depth: f32,
}

fn default_export_depth() -> f32 {
    DEFAULT_EXPORT_DEPTH
}

impl Default for AnimOptions {
    fn default() -> Self {
        Self {
            export_depth: DEFAULT_EXPORT_DEPTH,
        }
    }
}

/// Atlas split/pack options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasOptions {
    #[serde(default = "default_alignment")]
    pub alignment: u32,
    #[serde(default = "default_min_block_size")]
    pub min_block_size: u32,
    #[serde(default = "default_atlas_name")]
    pub atlas_name: String,
    #[serde(default)]
    pub resize_filter: ResizeFilter,
}

fn default_alignment() -> u32 {
    DEFAULT_ALIGNMENT
}

fn default_min_block_size() -> u32 {
    DEFAULT_MIN_BLOCK_SIZE
}

fn default_atlas_name() -> String {
    DEFAULT_ATLAS_NAME.to_string()
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            atlas_name: default_atlas_name(),
            resize_filter: ResizeFilter::default(),
        }
    }
}

/// Serializable mirror of [`FilterType`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktex::PixelFormat;

    #[test]
    fn test_empty_document_is_default() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.anim.export_depth, 10.0);
        assert_eq!(config.atlas.alignment, 4);
        assert_eq!(config.atlas.atlas_name, "atlas-0.tex");
    }

    #[test]
    fn test_partial_sections() {
        let config = CodecConfig::from_toml_str(
            r#"
            [atlas]
            min_block_size = 16
            resize_filter = "Nearest"

            [texture]
            pixel_format = "Dxt1"
            "#,
        )
        .unwrap();
        assert_eq!(config.atlas.min_block_size, 16);
        assert_eq!(config.atlas.alignment, DEFAULT_ALIGNMENT);
        assert_eq!(config.atlas.resize_filter, ResizeFilter::Nearest);
        assert_eq!(config.texture.pixel_format, PixelFormat::Dxt1);
        assert!(config.texture.premultiply);
        assert_eq!(config.anim, AnimOptions::default());
    }

    #[test]
    fn test_bad_value_is_an_error() {
        assert!(CodecConfig::from_toml_str("[atlas]\nalignment = \"four\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CodecConfig::default();
        config.anim.export_depth = 2.5;
        let text = toml::to_string(&config).unwrap();
        assert_eq!(CodecConfig::from_toml_str(&text).unwrap(), config);
    }
}
