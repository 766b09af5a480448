//! Configuration for the store writer.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for writing datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Chunk length for dimensions with an automatic chunk hint.
    pub default_chunk_size: usize,

    /// Compression codec for array chunks.
    pub compression: ZarrCompression,

    /// Compression level (1-9).
    pub compression_level: u8,

    /// Enable byte shuffle filter for better compression.
    pub shuffle: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_chunk_size: 512,
            compression: ZarrCompression::BloscZstd,
            compression_level: 1,
            shuffle: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `CUBE_CHUNK_SIZE`, `CUBE_COMPRESSION`, `CUBE_COMPRESSION_LEVEL`
    /// and `CUBE_SHUFFLE`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CUBE_CHUNK_SIZE") {
            match val.parse() {
                Ok(size) => config.default_chunk_size = size,
                Err(_) => warn!(value = %val, "Ignoring invalid CUBE_CHUNK_SIZE"),
            }
        }

        if let Ok(val) = std::env::var("CUBE_COMPRESSION") {
            match ZarrCompression::parse(&val) {
                Some(compression) => config.compression = compression,
                None => warn!(value = %val, "Ignoring invalid CUBE_COMPRESSION"),
            }
        }

        if let Ok(val) = std::env::var("CUBE_COMPRESSION_LEVEL") {
            match val.parse() {
                Ok(level) => config.compression_level = level,
                Err(_) => warn!(value = %val, "Ignoring invalid CUBE_COMPRESSION_LEVEL"),
            }
        }

        if let Ok(val) = std::env::var("CUBE_SHUFFLE") {
            config.shuffle = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_chunk_size == 0 {
            return Err("default_chunk_size must be > 0".to_string());
        }

        if self.compression != ZarrCompression::None
            && (self.compression_level == 0 || self.compression_level > 9)
        {
            return Err("compression_level must be 1-9".to_string());
        }

        Ok(())
    }
}

/// Compression codec for array chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZarrCompression {
    /// No compression.
    None,
    /// Blosc with LZ4.
    BloscLz4,
    /// Blosc with Zstd.
    #[default]
    BloscZstd,
}

impl ZarrCompression {
    /// Parse a codec name (case-insensitive). `lz4` and `zstd` are
    /// accepted as short forms of the blosc variants.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "lz4" | "blosc_lz4" => Some(Self::BloscLz4),
            "zstd" | "blosc_zstd" => Some(Self::BloscZstd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BloscLz4 => "blosc_lz4",
            Self::BloscZstd => "blosc_zstd",
        }
    }
}

impl std::fmt::Display for ZarrCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.compression, ZarrCompression::BloscZstd);
    }

    #[test]
    fn test_validate() {
        let config = StoreConfig {
            default_chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            compression_level: 12,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            compression: ZarrCompression::None,
            compression_level: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compression_parse() {
        assert_eq!(ZarrCompression::parse("LZ4"), Some(ZarrCompression::BloscLz4));
        assert_eq!(ZarrCompression::parse("blosc_zstd"), Some(ZarrCompression::BloscZstd));
        assert_eq!(ZarrCompression::parse("none"), Some(ZarrCompression::None));
        assert_eq!(ZarrCompression::parse("gzip"), None);
    }
}
