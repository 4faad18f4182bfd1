//! Error types for the NDK recipe
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// A settings combination the Android NDK cannot build for.
///
/// Raised by the validator before any download or flag computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Minimum API level supported is 16 (got {api_level})")]
    MinimumApiLevel { api_level: u32 },

    #[error("64-bit platforms require API level 21+ ({arch} requested API level {api_level})")]
    Bitness64ApiLevel { arch: String, api_level: u32 },

    #[error("clang 8 is the only supported compiler (got {compiler} {version})")]
    UnsupportedCompiler { compiler: String, version: String },

    #[error("Unsupported build machine OS: {0}")]
    UnsupportedHostOs(String),

    #[error("Unsupported build machine architecture: {0}")]
    UnsupportedHostArch(String),

    #[error("Target OS must be Android (got {0})")]
    WrongTargetOs(String),

    #[error("Arch {0} is not supported")]
    UnsupportedArch(String),

    #[error("Invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },
}

/// Main error type for the recipe's configuration layer
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Config file error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias for recipe operations
pub type Result<T> = std::result::Result<T, RecipeError>;

impl RecipeError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            RecipeError::Io(e) => format!("File operation failed: {}", e),
            RecipeError::Configuration(e) => format!("Unsupported configuration: {}", e),
            RecipeError::Config(msg) => format!("Configuration file error: {}", msg),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_rule() {
        let err = ConfigurationError::Bitness64ApiLevel {
            arch: "armv8".into(),
            api_level: 19,
        };
        assert!(err.to_string().contains("API level 21+"));

        let wrapped = RecipeError::from(err);
        assert!(wrapped.user_message().starts_with("Unsupported configuration"));
    }
}
