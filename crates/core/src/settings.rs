//! Package Settings
//!
//! Raw settings and options as a consumer provides them, plus the typed
//! target configuration they turn into once validated.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86,
    X86_64,
    Armv7,
    Armv8,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv8 => "armv8",
        }
    }

    /// Whether this architecture is a 64-bit one
    pub fn is_64bit(&self) -> bool {
        matches!(self, Arch::X86_64 | Arch::Armv8)
    }

    /// Whether this architecture belongs to the x86 family
    pub fn is_x86_family(&self) -> bool {
        matches!(self, Arch::X86 | Arch::X86_64)
    }

    pub fn all() -> &'static [Arch] {
        &[Arch::X86, Arch::X86_64, Arch::Armv7, Arch::Armv8]
    }
}

impl FromStr for Arch {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86" => Ok(Arch::X86),
            "x86_64" => Ok(Arch::X86_64),
            "armv7" => Ok(Arch::Armv7),
            "armv8" => Ok(Arch::Armv8),
            other => Err(ConfigurationError::UnsupportedArch(other.to_string())),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build type (debug/release)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

impl FromStr for BuildType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debug" => Ok(BuildType::Debug),
            "Release" => Ok(BuildType::Release),
            other => Err(ConfigurationError::InvalidValue {
                field: "build_type",
                value: other.to_string(),
            }),
        }
    }
}

/// How the C++ standard library is linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlLinkage {
    Static,
    #[default]
    Shared,
}

impl StlLinkage {
    pub fn as_str(&self) -> &'static str {
        match self {
            StlLinkage::Static => "static",
            StlLinkage::Shared => "shared",
        }
    }
}

impl FromStr for StlLinkage {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(StlLinkage::Static),
            "shared" => Ok(StlLinkage::Shared),
            other => Err(ConfigurationError::InvalidValue {
                field: "libcxx",
                value: other.to_string(),
            }),
        }
    }
}

/// ARM instruction set used for armv7 code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmMode {
    Thumb,
    #[default]
    Arm,
}

impl ArmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmMode::Thumb => "thumb",
            ArmMode::Arm => "arm",
        }
    }
}

impl FromStr for ArmMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" => Ok(ArmMode::Thumb),
            "arm" => Ok(ArmMode::Arm),
            other => Err(ConfigurationError::InvalidValue {
                field: "arm_mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Settings of the consuming build, unchecked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target operating system
    pub os: String,
    /// Target architecture
    pub arch: String,
    /// Target API level
    pub api_level: u32,
    /// Compiler identity
    pub compiler: String,
    /// Compiler version
    pub compiler_version: String,
    pub build_type: BuildType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            os: "Android".to_string(),
            arch: "armv8".to_string(),
            api_level: 21,
            compiler: "clang".to_string(),
            compiler_version: "8".to_string(),
            build_type: BuildType::Release,
        }
    }
}

/// Package options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub libcxx: StlLinkage,
    /// Only meaningful for armv7
    pub arm_mode: ArmMode,
    /// Only meaningful for armv7
    pub neon: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            libcxx: StlLinkage::Shared,
            arm_mode: ArmMode::Arm,
            neon: true,
        }
    }
}

/// armv7-only options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmOptions {
    pub mode: ArmMode,
    pub neon: bool,
}

/// A validated target configuration.
///
/// `arm` is `Some` exactly when `arch` is armv7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub arch: Arch,
    pub api_level: u32,
    pub build_type: BuildType,
    pub stl: StlLinkage,
    pub arm: Option<ArmOptions>,
}
