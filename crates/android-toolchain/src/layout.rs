//! Package Layout
//!
//! Every path inside a staged NDK package, and the plan that stages an
//! extracted archive into that shape. Paths use `/` on every host: they end
//! up in compiler command lines and CMake variables.

use std::path::Path;

use ndk_recipe_core::{Arch, HostPlatform, RecipeVariant, ToolchainLayout};

use crate::tables;

/// Version of the GCC toolchains bundled with the NDK
const GCC_VERSION: &str = "4.9";

/// Name of the toolchain file shipped with the recipe
pub const BUNDLED_TOOLCHAIN_FILE: &str = "android-toolchain.cmake";

/// Render `path` with forward slashes
pub fn posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn join(base: &str, parts: &[&str]) -> String {
    let mut out = base.trim_end_matches('/').to_string();
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}

/// One subtree copied from the extracted archive into the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingEntry {
    /// Relative to the extracted NDK root
    pub source: String,
    /// Relative to the package directory
    pub destination: String,
    /// Glob patterns, relative to `source`, that are not copied
    pub excludes: Vec<String>,
}

impl StagingEntry {
    fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            excludes: Vec::new(),
        }
    }
}

/// Paths of a staged package for one variant and host
#[derive(Debug, Clone)]
pub struct PackageLayout {
    root: String,
    variant: RecipeVariant,
    host: HostPlatform,
}

impl PackageLayout {
    /// Layout of the package for `variant` on `host` staged at `package_dir`
    pub fn new(package_dir: &Path, variant: RecipeVariant, host: HostPlatform) -> Self {
        Self {
            root: posix(package_dir),
            variant,
            host,
        }
    }

    /// Package directory
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn variant(&self) -> RecipeVariant {
        self.variant
    }

    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    fn llvm_relative(&self) -> Vec<&str> {
        match self.variant.layout() {
            ToolchainLayout::Retained => vec!["toolchains", "llvm", "prebuilt", self.host.tag()],
            ToolchainLayout::Flattened => vec!["llvm"],
        }
    }

    fn binutils_relative(&self, toolchain_dir: &str) -> Vec<String> {
        match self.variant.layout() {
            ToolchainLayout::Retained => vec![
                "toolchains".to_string(),
                toolchain_dir.to_string(),
                "prebuilt".to_string(),
                self.host.tag().to_string(),
            ],
            ToolchainLayout::Flattened => vec!["binutils".to_string(), toolchain_dir.to_string()],
        }
    }

    /// Root of the prebuilt LLVM toolchain
    pub fn llvm_root(&self) -> String {
        join(&self.root, &self.llvm_relative())
    }

    /// Directory holding clang and the binutils wrappers
    pub fn llvm_bin(&self) -> String {
        join(&self.llvm_root(), &["bin"])
    }

    /// Sysroot inside the LLVM toolchain
    pub fn sysroot(&self) -> String {
        join(&self.llvm_root(), &["sysroot"])
    }

    /// `--gcc-toolchain` directory for `arch`
    pub fn binutils(&self, arch: Arch) -> String {
        let dir = format!("{}-{}", tables::toolchain_triple(arch), GCC_VERSION);
        let parts = self.binutils_relative(&dir);
        let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
        join(&self.root, &parts)
    }

    /// Path of a host tool inside the llvm `bin` directory
    pub fn tool(&self, name: &str) -> String {
        format!("{}/{}{}", self.llvm_bin(), name, self.host.exe_suffix())
    }

    /// The NDK's own CMake toolchain file
    pub fn ndk_cmake_toolchain(&self) -> String {
        join(&self.root, &["build", "cmake", "android.toolchain.cmake"])
    }

    /// The toolchain file bundled with the recipe
    pub fn bundled_toolchain_file(&self) -> String {
        join(&self.root, &[BUNDLED_TOOLCHAIN_FILE])
    }

    /// Version metadata copied from the archive
    pub fn source_properties(&self) -> String {
        join(&self.root, &["source.properties"])
    }

    /// Headers of the support library linked below API level 21
    pub fn android_support_include(&self) -> String {
        join(&self.root, &["sources", "android", "support", "include"])
    }

    /// Subtrees copied from the extracted archive, in copy order
    pub fn staging_plan(&self) -> Vec<StagingEntry> {
        let excludes: Vec<String> = self
            .variant
            .excluded_experimental_headers()
            .iter()
            .map(|header| format!("**/experimental/{}", header))
            .collect();

        let mut plan = Vec::new();
        match self.variant.layout() {
            ToolchainLayout::Retained => {
                plan.push(StagingEntry {
                    excludes,
                    ..StagingEntry::new("toolchains", "toolchains")
                });
            }
            ToolchainLayout::Flattened => {
                let llvm = format!("toolchains/llvm/prebuilt/{}", self.host.tag());
                plan.push(StagingEntry {
                    excludes,
                    ..StagingEntry::new(llvm, "llvm")
                });
                for arch in Arch::all() {
                    let dir = format!("{}-{}", tables::toolchain_triple(*arch), GCC_VERSION);
                    plan.push(StagingEntry::new(
                        format!("toolchains/{}/prebuilt/{}", dir, self.host.tag()),
                        format!("binutils/{}", dir),
                    ));
                }
            }
        }
        plan.push(StagingEntry::new("build/cmake", "build/cmake"));
        plan.push(StagingEntry::new(
            "sources/android/support/include",
            "sources/android/support/include",
        ));
        plan.push(StagingEntry::new("source.properties", "source.properties"));
        plan
    }
}
