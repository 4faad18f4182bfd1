//! ndk-recipe - Android NDK package recipe
//!
//! Fetches the prebuilt Android NDK for the build machine, stages the parts
//! a cross build needs into a package directory, and derives the compiler
//! and linker flags plus environment for a target.
//!
//! ## Architecture
//!
//! - `ndk-recipe-core`: settings, host platform, recipe variants, config file, errors
//! - `ndk-recipe-toolchain`: lookup tables, validation, acquisition, flag derivation
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use ndk_recipe::core::{HostPlatform, Options, RecipeVariant, Settings};
//! use ndk_recipe::toolchain::{validate, FlagDeriver, PackageLayout};
//!
//! let host = HostPlatform::detect();
//! let target = validate(&Settings::default(), &Options::default(), &host).unwrap();
//! let layout = PackageLayout::new(Path::new("/opt/ndk"), RecipeVariant::R19b, host);
//! let info = FlagDeriver::new(&layout).derive(&target);
//! println!("{}", info.flags.compiler_flags.join(" "));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;

// Re-export main components for library usage
pub use ndk_recipe_core as core;
pub use ndk_recipe_toolchain as toolchain;
