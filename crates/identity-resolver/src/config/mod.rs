//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > CLI > defaults.
//! The caller passes a builder already carrying CLI values; file and
//! environment settings are layered on top of it.

mod builder;
mod env;
mod file;

pub use builder::{Config, ConfigBuilder, TelemetryConfig, TransportConfig};

use crate::Result;

/// Layer the discovered config file (if any) and environment over `base`
pub fn load_config(base: ConfigBuilder) -> Result<ConfigBuilder> {
    let mut builder = base;

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    env::load_from_env(builder)
}

/// Layer a specific config file and the environment over `base`
pub fn load_config_from_path(path: &std::path::Path, base: ConfigBuilder) -> Result<ConfigBuilder> {
    let builder = file::load_from_file(path, base)?;
    env::load_from_env(builder)
}
