//! # Core Engine Module
//!
//! Shared abstractions the rest of the engine builds on. Currently this is
//! the configuration system; foundation re-exports live here for convenience.

pub mod config;

pub use crate::foundation;

pub use config::{Config, ConfigError, EngineConfig, SceneSettings};
