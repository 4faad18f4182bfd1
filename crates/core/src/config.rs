//! Recipe Configuration
//!
//! Manages the recipe settings file:
//! - NDK variant and package root
//! - Target settings and package options
//! - Acquisition behavior (mirror, checksum verification, connect timeout)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use tracing::{info, debug};

use crate::error::{RecipeError, Result};
use crate::host::HostPlatform;
use crate::settings::{Options, Settings};
use crate::variant::RecipeVariant;

/// Where Google publishes NDK archives
pub const DEFAULT_MIRROR: &str = "https://dl.google.com/android/repository";

/// Acquisition configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Overrides the variant's default checksum verification
    pub verify_checksum: Option<bool>,
    /// Base URL archives are fetched from
    pub mirror: String,
    /// Limit on connection setup in seconds. Transfers themselves are not limited.
    pub connect_timeout_secs: u64,
    /// SHA1 digests keyed by archive platform suffix (`linux-x86_64`, ...)
    pub sha1: BTreeMap<String, String>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            verify_checksum: None,
            mirror: DEFAULT_MIRROR.to_string(),
            connect_timeout_secs: 30,
            sha1: BTreeMap::new(),
        }
    }
}

impl AcquisitionConfig {
    /// Whether downloads of `variant` are verified
    pub fn verify_checksum_for(&self, variant: RecipeVariant) -> bool {
        self.verify_checksum.unwrap_or_else(|| variant.verifies_checksum())
    }
}

/// Main recipe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// NDK release to package
    pub variant: RecipeVariant,
    /// Directory holding staged packages
    pub package_root: Option<PathBuf>,
    /// Target settings
    pub settings: Settings,
    /// Package options
    pub options: Options,
    /// Download settings
    pub acquisition: AcquisitionConfig,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            variant: RecipeVariant::default(),
            package_root: None,
            settings: Settings::default(),
            options: Options::default(),
            acquisition: AcquisitionConfig::default(),
        }
    }
}

impl RecipeConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "ndk-recipe", "ndk-recipe")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("recipe.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "ndk-recipe", "ndk-recipe")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from the default location, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| RecipeError::Config("Cannot determine config path".into()))?;

        if config_file.exists() {
            Self::load_from(&config_file).await
        } else {
            info!("Config file not found, using defaults");
            Ok(RecipeConfig::default())
        }
    }

    /// Load configuration from a file
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = tokio::fs::read_to_string(path).await?;
        let config: RecipeConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Root directory for staged packages
    pub fn package_root(&self) -> PathBuf {
        self.package_root.clone().unwrap_or_else(|| {
            Self::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("packages")
        })
    }

    /// Package directory for this variant on `host`. One per (version, host).
    pub fn package_dir(&self, host: &HostPlatform) -> PathBuf {
        self.package_root()
            .join(self.variant.archive_root())
            .join(host.tag())
    }
}
