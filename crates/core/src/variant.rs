//! Recipe Variants
//!
//! The recipe ships for two NDK releases whose packaging differs in a few
//! well-defined places. Every difference is a method here so the rest of
//! the code branches on behavior, not on the release name.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Where the prebuilt toolchains live inside the staged package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolchainLayout {
    /// `toolchains/llvm/prebuilt/<host>` and `toolchains/<triple>-4.9/prebuilt/<host>`,
    /// exactly as in the NDK archive
    Retained,
    /// `llvm/` and `binutils/<triple>-4.9/`
    Flattened,
}

/// NDK release packaged by the recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeVariant {
    #[default]
    R19b,
    R19c,
}

impl RecipeVariant {
    pub fn ndk_version(&self) -> &'static str {
        match self {
            RecipeVariant::R19b => "r19b",
            RecipeVariant::R19c => "r19c",
        }
    }

    /// Directory name the archive unpacks to
    pub fn archive_root(&self) -> String {
        format!("android-ndk-{}", self.ndk_version())
    }

    /// Whether the downloaded archive is checked against its SHA1 by default
    pub fn verifies_checksum(&self) -> bool {
        matches!(self, RecipeVariant::R19c)
    }

    /// libc++ `experimental/` headers left out of the package. They contain
    /// deliberate `#error` directives.
    pub fn excluded_experimental_headers(&self) -> &'static [&'static str] {
        match self {
            RecipeVariant::R19b => &[
                "any",
                "chrono",
                "numeric",
                "optional",
                "ratio",
                "string_view",
                "system_error",
                "tuple",
            ],
            RecipeVariant::R19c => &[],
        }
    }

    /// Whether links select `ld.lld` through `-fuse-ld=`
    pub fn uses_lld(&self) -> bool {
        matches!(self, RecipeVariant::R19b)
    }

    /// Whether armv7 links get `--fix-cortex-a8`
    pub fn fixes_cortex_a8(&self) -> bool {
        matches!(self, RecipeVariant::R19c)
    }

    pub fn layout(&self) -> ToolchainLayout {
        match self {
            RecipeVariant::R19b => ToolchainLayout::Retained,
            RecipeVariant::R19c => ToolchainLayout::Flattened,
        }
    }

    pub fn all() -> &'static [RecipeVariant] {
        &[RecipeVariant::R19b, RecipeVariant::R19c]
    }
}

impl FromStr for RecipeVariant {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r19b" => Ok(RecipeVariant::R19b),
            "r19c" => Ok(RecipeVariant::R19c),
            other => Err(ConfigurationError::InvalidValue {
                field: "variant",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RecipeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ndk_version())
    }
}
