//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for configuration storage
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load configuration; a missing file yields an empty config
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Persist configuration
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Configuration file path
    fn path(&self) -> PathBuf;

    /// Check if the configuration file exists
    fn exists(&self) -> bool;

    /// Write a file with defaults. Fails if one already exists.
    async fn init(&self) -> Result<(), ConfigError>;
}
