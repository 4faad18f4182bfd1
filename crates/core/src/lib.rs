//! NDK Recipe Core - shared types
//!
//! Settings, host platform model, recipe variants, configuration file
//! handling and the error taxonomy used by every other crate.

pub mod config;
pub mod error;
pub mod host;
pub mod settings;
pub mod variant;

pub use config::{AcquisitionConfig, RecipeConfig, DEFAULT_MIRROR};
pub use error::{ConfigurationError, RecipeError, Result};
pub use host::{HostOs, HostPlatform};
pub use settings::{Arch, ArmMode, ArmOptions, BuildType, Options, Settings, StlLinkage, TargetConfig};
pub use variant::{RecipeVariant, ToolchainLayout};

/// Recipe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
