//! Platform table - box dimensions, base color, and material per platform
//!
//! Dimensions are in scene units (roughly decimeters) so that a standard case
//! fits comfortably in front of the default camera.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Unknown platform: {0}")]
    Unknown(String),
}

/// Console/PC category that drives default box dimensions and color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Platform {
    #[default]
    Xbox,
    Xbox360,
    Playstation,
    Pc,
    Standard,
}

/// Static rendering properties for one platform
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformConfig {
    pub platform: Platform,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Frame color as `#RRGGBB`
    pub base_color: &'static str,
    pub metalness: f32,
    pub roughness: f32,
    /// 0.0 = opaque, 1.0 = fully transparent
    pub transparency: f32,
}

static PLATFORM_CONFIGS: [PlatformConfig; 5] = [
    PlatformConfig {
        platform: Platform::Xbox,
        width: 1.35,
        height: 1.9,
        depth: 0.14,
        base_color: "#107C10",
        metalness: 0.1,
        roughness: 0.4,
        transparency: 0.0,
    },
    PlatformConfig {
        platform: Platform::Xbox360,
        width: 1.35,
        height: 1.9,
        depth: 0.14,
        base_color: "#92C83E",
        metalness: 0.1,
        roughness: 0.35,
        transparency: 0.0,
    },
    PlatformConfig {
        platform: Platform::Playstation,
        width: 1.35,
        height: 1.7,
        depth: 0.14,
        base_color: "#0070D1",
        metalness: 0.1,
        roughness: 0.4,
        transparency: 0.1,
    },
    PlatformConfig {
        platform: Platform::Pc,
        width: 1.35,
        height: 1.9,
        depth: 0.15,
        base_color: "#1A1A1A",
        metalness: 0.2,
        roughness: 0.5,
        transparency: 0.0,
    },
    PlatformConfig {
        platform: Platform::Standard,
        width: 1.4,
        height: 1.9,
        depth: 0.15,
        base_color: "#FFFFFF",
        metalness: 0.0,
        roughness: 0.6,
        transparency: 0.0,
    },
];

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Xbox,
        Platform::Xbox360,
        Platform::Playstation,
        Platform::Pc,
        Platform::Standard,
    ];

    /// Identifier used in URLs, config files, and persisted records
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Xbox => "xbox",
            Platform::Xbox360 => "xbox360",
            Platform::Playstation => "playstation",
            Platform::Pc => "pc",
            Platform::Standard => "standard",
        }
    }

    /// Human readable name for selectors
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Xbox => "Xbox",
            Platform::Xbox360 => "Xbox 360",
            Platform::Playstation => "PlayStation",
            Platform::Pc => "PC",
            Platform::Standard => "Standard",
        }
    }

    pub fn config(&self) -> &'static PlatformConfig {
        let index = Platform::ALL
            .iter()
            .position(|p| p == self)
            .unwrap_or(0);
        &PLATFORM_CONFIGS[index]
    }

    pub fn base_color(&self) -> &'static str {
        self.config().base_color
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| PlatformError::Unknown(s.to_string()))
    }
}

impl TryFrom<String> for Platform {
    type Error = PlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_hex;

    #[test]
    fn test_every_platform_has_sane_config() {
        for platform in Platform::ALL {
            let config = platform.config();
            assert_eq!(config.platform, platform);
            assert!(config.width > 0.0 && config.height > 0.0 && config.depth > 0.0);
            assert!(parse_hex(config.base_color).is_some(), "{}", config.base_color);
            for value in [config.metalness, config.roughness, config.transparency] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_known_base_colors() {
        assert_eq!(Platform::Xbox.base_color(), "#107C10");
        assert_eq!(Platform::Playstation.base_color(), "#0070D1");
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("xbox360".parse::<Platform>().unwrap(), Platform::Xbox360);
        assert_eq!(" PlayStation ".parse::<Platform>().unwrap(), Platform::Playstation);
        assert!("dreamcast".parse::<Platform>().is_err());
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&Platform::Xbox360).unwrap();
        assert_eq!(json, "\"xbox360\"");
        let back: Platform = serde_json::from_str("\"pc\"").unwrap();
        assert_eq!(back, Platform::Pc);
    }

    #[test]
    fn test_serde_matches_from_str() {
        let back: Platform = serde_json::from_str("\"PlayStation\"").unwrap();
        assert_eq!(back, Platform::Playstation);
        let back: Platform = serde_json::from_str("\" XBOX360 \"").unwrap();
        assert_eq!(back, Platform::Xbox360);

        let err = serde_json::from_str::<Platform>("\"dreamcast\"").unwrap_err();
        assert!(err.to_string().contains("Unknown platform: dreamcast"));
    }
}
