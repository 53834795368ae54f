//! # Configuration System
//!
//! Serializable settings for the engine, loaded from TOML files. Every
//! settings struct has working defaults, so a missing or partial file is
//! never fatal to an application that can run on defaults.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::scene::volume::Aabb;
use crate::spatial::UniformTreeConfig;

/// Trait for loadable/savable configuration types.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a TOML file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".toml") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        if !path.ends_with(".toml") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Settings for the scene's spatial index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Half-extent of the cubic world domain the spatial index covers
    pub domain_half_extent: f32,
    /// Subdivision depth of the uniform tree
    pub tree_depth: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            domain_half_extent: 512.0,
            tree_depth: 3,
        }
    }
}

impl SceneSettings {
    /// Uniform tree configuration matching these settings
    pub fn tree_config(&self) -> UniformTreeConfig {
        let half = self.domain_half_extent;
        UniformTreeConfig {
            domain: Aabb::from_center_extents(Vec3::zeros(), Vec3::new(half, half, half)),
            depth: self.tree_depth,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scene and spatial index settings
    pub scene: SceneSettings,
}

impl Config for EngineConfig {}
