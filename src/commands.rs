//! CLI commands for the NDK recipe
//!
//! Each command validates the configured settings first, so unsupported
//! combinations fail before anything is downloaded or derived.

use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use ndk_recipe_core::{HostPlatform, RecipeConfig, TargetConfig};
use ndk_recipe_toolchain::{
    validate, EnvFileWriter, FlagDeriver, NdkDownloader, PackageInfo, PackageLayout, ProgressCallback,
    StagedPackage,
};

/// Configuration and host shared by every command
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Settings after command line overrides
    pub config: RecipeConfig,
    /// Build machine
    pub host: HostPlatform,
}

impl Recipe {
    /// Recipe for `config` on `host`
    pub fn new(config: RecipeConfig, host: HostPlatform) -> Self {
        Self { config, host }
    }

    /// Validate the configured settings for this host
    pub fn target(&self) -> Result<TargetConfig> {
        let target = validate(&self.config.settings, &self.config.options, &self.host)?;
        Ok(target)
    }

    /// Package directory for the configured variant on this host
    pub fn package_dir(&self) -> PathBuf {
        self.config.package_dir(&self.host)
    }

    /// Paths inside the package directory
    pub fn layout(&self) -> PackageLayout {
        PackageLayout::new(&self.package_dir(), self.config.variant, self.host.clone())
    }

    /// Flags and exports for the configured target. The package must be
    /// staged, the flags point into it.
    pub fn package_info(&self) -> Result<PackageInfo> {
        let target = self.target()?;
        let layout = self.layout();
        if !StagedPackage::exists(&layout) {
            bail!("NDK package not staged at {}, run `install` first", layout.root());
        }
        debug!("Deriving flags from {}", layout.root());
        Ok(FlagDeriver::new(&layout).derive(&target))
    }
}

/// Validate command
pub struct ValidateCommand {
    /// Recipe to check
    pub recipe: Recipe,
}

impl ValidateCommand {
    /// Validated target, or the first violated rule
    pub fn execute(&self) -> Result<TargetConfig> {
        let target = self.recipe.target()?;
        info!(
            "Configuration valid: {} API {} on {}",
            target.arch, target.api_level, self.recipe.host
        );
        Ok(target)
    }
}

/// Install command options
pub struct InstallCommand {
    /// Recipe to install
    pub recipe: Recipe,
    /// Re-download even if the package is staged
    pub force: bool,
}

impl InstallCommand {
    /// Execute the install command
    pub async fn execute(&self, progress: Option<ProgressCallback>) -> Result<PathBuf> {
        self.recipe.target()?;

        let package_dir = self.recipe.package_dir();
        let layout = self.recipe.layout();
        if !self.force && StagedPackage::exists(&layout) {
            info!("NDK {} already staged at {:?}", self.recipe.config.variant, package_dir);
            return Ok(package_dir);
        }

        let downloader = NdkDownloader::new(self.recipe.config.acquisition.clone())?;
        let path = downloader
            .acquire(self.recipe.config.variant, &self.recipe.host, &package_dir, progress)
            .await
            .with_context(|| format!("Failed to acquire NDK {}", self.recipe.config.variant))?;
        Ok(path)
    }
}

/// Flags command
pub struct FlagsCommand {
    /// Recipe to derive flags for
    pub recipe: Recipe,
}

impl FlagsCommand {
    /// Package info as pretty JSON
    pub fn execute(&self) -> Result<String> {
        let info = self.recipe.package_info()?;
        Ok(serde_json::to_string_pretty(&info)?)
    }
}

/// Env command options
pub struct EnvCommand {
    /// Recipe to export
    pub recipe: Recipe,
    /// `.env` file to write
    pub dotenv: Option<PathBuf>,
    /// Shell script to write
    pub script: Option<PathBuf>,
}

impl EnvCommand {
    /// Write the requested files and return shell exports
    pub async fn execute(&self) -> Result<String> {
        let info = self.recipe.package_info()?;

        if let Some(path) = &self.dotenv {
            EnvFileWriter::write_dotenv(path, &info.env).await?;
        }
        if let Some(path) = &self.script {
            EnvFileWriter::write_shell_script(path, &info.env).await?;
        }

        Ok(info.env.shell_exports())
    }
}

/// Info command
pub struct InfoCommand {
    /// Recipe whose package is described
    pub recipe: Recipe,
}

impl InfoCommand {
    /// Summary of the staged package
    pub async fn execute(&self) -> Result<String> {
        let layout = self.recipe.layout();
        let staged = StagedPackage::open(&layout)
            .await
            .with_context(|| format!("No usable NDK package at {}", layout.root()))?;

        let mut out = String::new();
        out.push_str(&format!("NDK:        {} ({})\n", self.recipe.config.variant, staged.revision));
        out.push_str(&format!("Host:       {} [{}]\n", self.recipe.host, self.recipe.host.tag()));
        out.push_str(&format!("Package:    {}\n", layout.root()));
        out.push_str(&format!("Toolchain:  {}\n", layout.llvm_root()));
        out.push_str(&format!("Sysroot:    {}\n", layout.sysroot()));
        out.push_str(&format!("CMake file: {}\n", layout.bundled_toolchain_file()));
        Ok(out)
    }
}
