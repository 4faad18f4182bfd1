//! Package Staging
//!
//! Copies the planned subtrees of an extracted NDK into a package
//! directory, keeping symlinks and permissions, and reads back what a
//! staged package contains.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use glob::Pattern;
use tracing::{info, debug};
use walkdir::WalkDir;

use crate::layout::{PackageLayout, StagingEntry, BUNDLED_TOOLCHAIN_FILE};

/// CMake toolchain file shipped with the recipe, copied verbatim into packages
pub const BUNDLED_TOOLCHAIN: &str = include_str!("../resources/android-toolchain.cmake");

fn compile_excludes(excludes: &[String]) -> io::Result<Vec<Pattern>> {
    excludes
        .iter()
        .map(|e| Pattern::new(e).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err)))
        .collect()
}

/// Recreate the symlink `src` at `dst`
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        let target = fs::read_link(src)?;
        std::os::unix::fs::symlink(target, dst)
    }
    #[cfg(not(unix))]
    {
        // Symlink creation needs privileges on Windows, copy the target instead
        if src.is_dir() {
            fs::create_dir_all(dst)
        } else {
            fs::copy(src, dst).map(|_| ())
        }
    }
}

/// Copy one staging entry, returning the number of files written
fn stage_entry(ndk_root: &Path, package_dir: &Path, entry: &StagingEntry) -> io::Result<u64> {
    let source = ndk_root.join(&entry.source);
    let destination = package_dir.join(&entry.destination);
    let excludes = compile_excludes(&entry.excludes)?;

    let meta = fs::symlink_metadata(&source).map_err(|e| {
        io::Error::new(e.kind(), format!("{} missing from NDK archive: {}", entry.source, e))
    })?;

    if !meta.is_dir() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, &destination)?;
        return Ok(1);
    }

    let mut copied = 0;
    let mut walker = WalkDir::new(&source).follow_links(false).into_iter();
    while let Some(item) = walker.next() {
        let item = item.map_err(io::Error::from)?;
        let relative = item
            .path()
            .strip_prefix(&source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        if excludes.iter().any(|p| p.matches_path(relative)) {
            debug!("Excluding {:?}", relative);
            if item.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let target = destination.join(relative);
        let file_type = item.file_type();
        if file_type.is_symlink() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            copy_symlink(item.path(), &target)?;
            copied += 1;
        } else if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            // fs::copy carries the permission bits over
            fs::copy(item.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Stage an extracted NDK rooted at `ndk_root` into `package_dir`
pub fn stage_package(ndk_root: &Path, package_dir: &Path, layout: &PackageLayout) -> io::Result<u64> {
    info!("Staging {:?} into {:?}", ndk_root, package_dir);
    fs::create_dir_all(package_dir)?;

    let mut total = 0;
    for entry in layout.staging_plan() {
        let copied = stage_entry(ndk_root, package_dir, &entry)?;
        debug!("Staged {} files from {}", copied, entry.source);
        total += copied;
    }

    fs::write(package_dir.join(BUNDLED_TOOLCHAIN_FILE), BUNDLED_TOOLCHAIN)?;
    total += 1;

    info!("Staged {} files", total);
    Ok(total)
}

/// Errors reading a staged package
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Package not staged at {0}")]
    NotFound(PathBuf),
    #[error("Invalid package: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A package directory populated by a previous acquisition
#[derive(Debug, Clone)]
pub struct StagedPackage {
    /// Package directory
    pub path: PathBuf,
    /// `Pkg.Revision` from `source.properties`
    pub revision: String,
}

impl StagedPackage {
    /// Whether `layout` points at a staged package
    pub fn exists(layout: &PackageLayout) -> bool {
        Path::new(&layout.source_properties()).is_file()
    }

    /// Read the staged package described by `layout`
    pub async fn open(layout: &PackageLayout) -> Result<Self, PackageError> {
        let path = PathBuf::from(layout.root());
        if !path.exists() {
            return Err(PackageError::NotFound(path));
        }

        let source_props = layout.source_properties();
        let content = tokio::fs::read_to_string(&source_props)
            .await
            .map_err(|_| PackageError::Invalid("source.properties not found".into()))?;

        let revision = parse_revision(&content)
            .ok_or_else(|| PackageError::Invalid("Pkg.Revision missing from source.properties".into()))?;

        Ok(Self { path, revision })
    }
}

fn parse_revision(properties: &str) -> Option<String> {
    properties
        .lines()
        .filter(|line| line.trim_start().starts_with("Pkg.Revision"))
        .find_map(|line| line.split('=').nth(1))
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndk_recipe_core::{HostOs, HostPlatform, RecipeVariant};

    fn linux() -> HostPlatform {
        HostPlatform::new(HostOs::Linux, "x86_64")
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Minimal extracted NDK tree
    fn fake_ndk(root: &Path) {
        let llvm = root.join("toolchains/llvm/prebuilt/linux-x86_64");
        write(&llvm.join("bin/clang"), "clang");
        write(&llvm.join("sysroot/usr/include/c++/v1/vector"), "vector");
        write(&llvm.join("sysroot/usr/include/c++/v1/experimental/optional"), "#error");
        write(&llvm.join("sysroot/usr/include/c++/v1/experimental/coroutine"), "coroutine");
        for dir in ["arm-linux-androideabi-4.9", "aarch64-linux-android-4.9", "x86-4.9", "x86_64-4.9"] {
            write(
                &root.join("toolchains").join(dir).join("prebuilt/linux-x86_64/bin/as"),
                "as",
            );
        }
        write(&root.join("build/cmake/android.toolchain.cmake"), "# ndk");
        write(&root.join("sources/android/support/include/stdlib.h"), "");
        write(&root.join("source.properties"), "Pkg.Desc = Android NDK\nPkg.Revision = 19.1.5304403\n");
        write(&root.join("platforms/android-21/README"), "not staged");
    }

    #[test]
    fn test_stage_retained_layout() {
        let ndk = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fake_ndk(ndk.path());

        let layout = PackageLayout::new(pkg.path(), RecipeVariant::R19b, linux());
        stage_package(ndk.path(), pkg.path(), &layout).unwrap();

        let include = Path::new(&layout.sysroot()).join("usr/include/c++/v1");
        assert!(include.join("vector").is_file());
        assert!(include.join("experimental/coroutine").is_file());
        assert!(!include.join("experimental/optional").exists());
        assert!(Path::new(&layout.bundled_toolchain_file()).is_file());
        assert!(Path::new(&layout.ndk_cmake_toolchain()).is_file());
        assert!(!pkg.path().join("platforms").exists());
        assert!(StagedPackage::exists(&layout));
    }

    #[test]
    fn test_stage_flattened_layout() {
        let ndk = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fake_ndk(ndk.path());

        let layout = PackageLayout::new(pkg.path(), RecipeVariant::R19c, linux());
        stage_package(ndk.path(), pkg.path(), &layout).unwrap();

        assert!(Path::new(&layout.llvm_bin()).join("clang").is_file());
        assert!(Path::new(&layout.sysroot())
            .join("usr/include/c++/v1/experimental/optional")
            .is_file());
        for arch in ndk_recipe_core::Arch::all() {
            assert!(Path::new(&layout.binutils(*arch)).join("bin/as").is_file());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stage_keeps_symlinks() {
        let ndk = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fake_ndk(ndk.path());
        let bin = ndk.path().join("toolchains/llvm/prebuilt/linux-x86_64/bin");
        std::os::unix::fs::symlink("clang", bin.join("clang++")).unwrap();

        let layout = PackageLayout::new(pkg.path(), RecipeVariant::R19b, linux());
        stage_package(ndk.path(), pkg.path(), &layout).unwrap();

        let link = Path::new(&layout.llvm_bin()).join("clang++");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("clang"));
    }

    #[test]
    fn test_stage_missing_subtree_fails() {
        let ndk = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        write(&ndk.path().join("source.properties"), "Pkg.Revision = 19.1\n");

        let layout = PackageLayout::new(pkg.path(), RecipeVariant::R19b, linux());
        assert!(stage_package(ndk.path(), pkg.path(), &layout).is_err());
    }

    #[test]
    fn test_parse_revision() {
        assert_eq!(
            parse_revision("Pkg.Desc = Android NDK\nPkg.Revision = 19.2.5345600\n"),
            Some("19.2.5345600".to_string())
        );
        assert_eq!(parse_revision("Pkg.Desc = Android NDK\n"), None);
    }

    #[tokio::test]
    async fn test_open_staged_package() {
        let ndk = tempfile::tempdir().unwrap();
        let pkg = tempfile::tempdir().unwrap();
        fake_ndk(ndk.path());

        let layout = PackageLayout::new(pkg.path(), RecipeVariant::R19b, linux());
        assert!(matches!(
            StagedPackage::open(&layout).await,
            Err(PackageError::Invalid(_))
        ));

        stage_package(ndk.path(), pkg.path(), &layout).unwrap();
        let staged = StagedPackage::open(&layout).await.unwrap();
        assert_eq!(staged.revision, "19.1.5304403");
    }
}
