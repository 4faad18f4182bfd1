//! Android NDK Toolchain Package
//!
//! Handles everything between a set of build settings and a usable
//! cross-compilation toolchain:
//! - Validation of target settings against what the NDK supports
//! - Download, verification, extraction and staging of the NDK
//! - Compiler/linker flags and exported environment for consuming builds

pub mod downloader;
pub mod env;
pub mod flags;
pub mod layout;
pub mod stage;
pub mod tables;
pub mod validator;

pub use downloader::{AcquisitionError, NdkArchive, NdkDownloader, ProgressCallback, resolve_archive};
pub use env::{EnvFileWriter, EnvironmentExports};
pub use flags::{FlagDeriver, FlagSet, PackageInfo};
pub use layout::PackageLayout;
pub use stage::{PackageError, StagedPackage};
pub use tables::AbiTriple;
pub use validator::{validate, MIN_API_LEVEL, MIN_API_LEVEL_64BIT};

