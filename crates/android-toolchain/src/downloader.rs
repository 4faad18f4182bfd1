//! NDK Acquisition
//!
//! Resolves, downloads, verifies and extracts the prebuilt NDK archive for
//! a host, then stages it into the package directory. Work happens in a
//! temporary directory next to the package; the package directory only
//! appears once everything succeeded.

use std::io;
use std::path::{Path, PathBuf};
use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{info, debug, warn};

use ndk_recipe_core::{AcquisitionConfig, HostOs, HostPlatform, RecipeVariant};

use crate::layout::PackageLayout;
use crate::stage;

/// Download progress callback: (downloaded, total) in bytes
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Published SHA1 digests for archives of verifying variants
const R19C_SHA1: &[(&str, &str)] = &[
    ("darwin-x86_64", "f46b8193109bba8a58e0461c1a48f4534051fb25"),
    ("linux-x86_64", "fd94d0be6017c6acbd193eb95e09cf4b6f61b834"),
];

/// Acquisition errors
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("No NDK archive for host platform {0}")]
    UnsupportedHostPlatform(String),
    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    Integrity {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("No SHA1 digest known for {0}; add one under [acquisition.sha1] or disable verification")]
    MissingDigest(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Extraction failed: {0}")]
    Extraction(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A resolved NDK archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdkArchive {
    /// `linux-x86_64`, `windows-x86`, ...
    pub platform: &'static str,
    pub file_name: String,
    pub url: String,
    /// Expected digest, from the configuration or the built-in table
    pub sha1: Option<String>,
}

/// Archive platform suffix for `host`, if the NDK ships one
fn archive_platform(host: &HostPlatform) -> Option<&'static str> {
    match (&host.os, host.machine.as_str()) {
        (HostOs::Windows, "AMD64" | "x86_64") => Some("windows-x86_64"),
        (HostOs::Windows, "x86") => Some("windows-x86"),
        (HostOs::Macos, "x86_64") => Some("darwin-x86_64"),
        (HostOs::Linux, "x86_64") => Some("linux-x86_64"),
        _ => None,
    }
}

fn builtin_sha1(variant: RecipeVariant, platform: &str) -> Option<&'static str> {
    let table = match variant {
        RecipeVariant::R19b => return None,
        RecipeVariant::R19c => R19C_SHA1,
    };
    table.iter().find(|(p, _)| *p == platform).map(|(_, digest)| *digest)
}

/// Resolve the archive for `variant` on `host` under the configured mirror.
/// Never touches the network.
pub fn resolve_archive(
    variant: RecipeVariant,
    host: &HostPlatform,
    config: &AcquisitionConfig,
) -> Result<NdkArchive, AcquisitionError> {
    let platform = archive_platform(host)
        .ok_or_else(|| AcquisitionError::UnsupportedHostPlatform(host.to_string()))?;

    let file_name = format!("android-ndk-{}-{}.zip", variant.ndk_version(), platform);
    let sha1 = config
        .sha1
        .get(platform)
        .cloned()
        .or_else(|| builtin_sha1(variant, platform).map(String::from));

    Ok(NdkArchive {
        platform,
        url: format!("{}/{}", config.mirror.trim_end_matches('/'), file_name),
        file_name,
        sha1,
    })
}

/// Compute the SHA1 of a file
pub async fn sha1_file(path: &Path) -> io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::File::open(&path)?;
        let mut hasher = Sha1::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Check `path` against `expected`
pub async fn verify_sha1(path: &Path, expected: &str) -> Result<(), AcquisitionError> {
    debug!("Verifying checksum for {:?}", path);

    let actual = sha1_file(path).await?;
    if actual.eq_ignore_ascii_case(expected) {
        debug!("Checksum verified");
        Ok(())
    } else {
        warn!("Checksum mismatch: expected {}, got {}", expected, actual);
        Err(AcquisitionError::Integrity {
            file: path.to_string_lossy().to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Fail if writing `relative` under `root` would go through a symlink
/// created by an earlier entry.
fn ensure_no_symlink(root: &Path, relative: &Path) -> Result<(), AcquisitionError> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(AcquisitionError::Extraction(format!(
                    "{} is written through a symbolic link",
                    relative.display()
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Whether a link at `relative` pointing to `link_target` resolves inside
/// the extraction root. Absolute targets never do.
fn link_stays_inside(relative: &Path, link_target: &str) -> bool {
    use std::path::Component;

    let mut depth = relative.components().count().saturating_sub(1);
    for component in Path::new(link_target).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// Extract a ZIP file, restoring unix permissions and symlinks
pub async fn extract_zip(archive: &Path, target_dir: &Path) -> Result<(), AcquisitionError> {
    info!("Extracting {:?} to {:?}", archive, target_dir);

    let archive = archive.to_path_buf();
    let target_dir = target_dir.to_path_buf();

    // zip is synchronous
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive)?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| AcquisitionError::Extraction(e.to_string()))?;

        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| AcquisitionError::Extraction(e.to_string()))?;

            let relative = entry
                .enclosed_name()
                .map(Path::to_path_buf)
                .ok_or_else(|| AcquisitionError::Extraction(format!("Unsafe path {}", entry.name())))?;
            ensure_no_symlink(&target_dir, &relative)?;
            let outpath = target_dir.join(&relative);
            let mode = entry.unix_mode();

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)?;
                continue;
            }
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }

            if mode.map_or(false, |m| m & S_IFMT == S_IFLNK) {
                let mut link_target = String::new();
                io::Read::read_to_string(&mut entry, &mut link_target)?;
                if !link_stays_inside(&relative, &link_target) {
                    return Err(AcquisitionError::Extraction(format!(
                        "Symbolic link {} points outside the archive: {}",
                        relative.display(),
                        link_target
                    )));
                }
                write_symlink(&link_target, &outpath)?;
                continue;
            }

            let mut outfile = std::fs::File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = mode {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode & 0o7777))?;
                }
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| AcquisitionError::Extraction(e.to_string()))?
}

#[cfg(unix)]
fn write_symlink(link_target: &str, outpath: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link_target, outpath)
}

#[cfg(not(unix))]
fn write_symlink(link_target: &str, outpath: &Path) -> io::Result<()> {
    // Keep the link as a file naming its target
    std::fs::write(outpath, link_target)
}

/// NDK downloader
pub struct NdkDownloader {
    client: Client,
    config: AcquisitionConfig,
}

impl NdkDownloader {
    /// Create a new downloader
    pub fn new(config: AcquisitionConfig) -> Result<Self, AcquisitionError> {
        // Only connection setup is bounded, a slow archive transfer runs to completion
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Acquisition settings this downloader was built with
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Download a file with progress reporting
    pub async fn download_file(
        &self,
        url: &str,
        target: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<(), AcquisitionError> {
        info!("Downloading {} to {:?}", url, target);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AcquisitionError::InvalidResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(target).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(callback) = progress {
                callback(downloaded, total_size);
            }
        }

        file.flush().await?;

        info!("Download complete: {:?}", target);
        Ok(())
    }

    /// Fetch the NDK for `variant` on `host` and stage it into `package_dir`.
    ///
    /// An existing package directory is replaced only after the new one is
    /// fully staged.
    pub async fn acquire(
        &self,
        variant: RecipeVariant,
        host: &HostPlatform,
        package_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<PathBuf, AcquisitionError> {
        let archive = resolve_archive(variant, host, &self.config)?;
        let expected_sha1 = if self.config.verify_checksum_for(variant) {
            let digest = archive
                .sha1
                .clone()
                .ok_or_else(|| AcquisitionError::MissingDigest(archive.file_name.clone()))?;
            Some(digest)
        } else {
            None
        };

        let parent = package_dir.parent().unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent).await?;
        let work = tempfile::Builder::new().prefix(".ndk-").tempdir_in(parent)?;

        let archive_path = work.path().join(&archive.file_name);
        self.download_file(&archive.url, &archive_path, progress.as_ref()).await?;

        match expected_sha1 {
            Some(expected) => verify_sha1(&archive_path, &expected).await?,
            None => debug!("Checksum verification disabled for {}", variant),
        }

        let extracted = work.path().join("extracted");
        extract_zip(&archive_path, &extracted).await?;
        tokio::fs::remove_file(&archive_path).await?;

        let ndk_root = extracted.join(variant.archive_root());
        let staged = work.path().join("staged");
        let layout = PackageLayout::new(package_dir, variant, host.clone());
        {
            let ndk_root = ndk_root.clone();
            let staged = staged.clone();
            tokio::task::spawn_blocking(move || stage::stage_package(&ndk_root, &staged, &layout))
                .await
                .map_err(|e| AcquisitionError::Extraction(e.to_string()))??;
        }

        if tokio::fs::try_exists(package_dir).await? {
            tokio::fs::remove_dir_all(package_dir).await?;
        }
        tokio::fs::rename(&staged, package_dir).await?;

        info!("NDK {} installed to {:?}", variant, package_dir);
        Ok(package_dir.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve `body` to every request on a local port, optionally one byte at
    /// a time with `delay` between bytes. Returns the base URL and a request
    /// counter.
    async fn serve(body: Vec<u8>, delay: Option<Duration>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let header = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    if socket.write_all(header.as_bytes()).await.is_err() {
                        return;
                    }
                    match delay {
                        Some(delay) => {
                            for byte in body.chunks(1) {
                                tokio::time::sleep(delay).await;
                                if socket.write_all(byte).await.is_err() {
                                    return;
                                }
                                let _ = socket.flush().await;
                            }
                        }
                        None => {
                            let _ = socket.write_all(&body).await;
                        }
                    }
                    let _ = socket.shutdown().await;
                });
            }
        });

        (base, hits)
    }

    /// Zip holding the subtrees staged for r19b on Linux
    fn ndk_zip() -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        let exec = zip::write::FileOptions::default().unix_permissions(0o755);
        let plain = zip::write::FileOptions::default().unix_permissions(0o644);
        let files = [
            ("toolchains/llvm/prebuilt/linux-x86_64/bin/clang", "clang", exec),
            (
                "toolchains/llvm/prebuilt/linux-x86_64/sysroot/usr/include/c++/v1/vector",
                "vector",
                plain,
            ),
            (
                "toolchains/llvm/prebuilt/linux-x86_64/sysroot/usr/include/c++/v1/experimental/optional",
                "#error",
                plain,
            ),
            ("build/cmake/android.toolchain.cmake", "# ndk", plain),
            ("sources/android/support/include/stdlib.h", "", plain),
            ("source.properties", "Pkg.Desc = Android NDK\nPkg.Revision = 19.1.5304403\n", plain),
        ];
        for (name, content, options) in files {
            zip.start_file(format!("android-ndk-r19b/{}", name), options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn sha1_hex(data: &[u8]) -> String {
        hex::encode(Sha1::digest(data))
    }

    fn linux() -> HostPlatform {
        HostPlatform::new(HostOs::Linux, "x86_64")
    }

    #[test]
    fn test_resolve_archive_urls() {
        let config = AcquisitionConfig::default();
        let cases = [
            (HostPlatform::new(HostOs::Windows, "AMD64"), "windows-x86_64"),
            (HostPlatform::new(HostOs::Windows, "x86"), "windows-x86"),
            (HostPlatform::new(HostOs::Macos, "x86_64"), "darwin-x86_64"),
            (HostPlatform::new(HostOs::Linux, "x86_64"), "linux-x86_64"),
        ];

        for (host, platform) in cases {
            let archive = resolve_archive(RecipeVariant::R19b, &host, &config).unwrap();
            assert_eq!(archive.platform, platform);
            assert_eq!(
                archive.url,
                format!(
                    "https://dl.google.com/android/repository/android-ndk-r19b-{}.zip",
                    platform
                )
            );
            assert_eq!(archive.sha1, None);
        }

        let mirrored = AcquisitionConfig {
            mirror: "http://127.0.0.1:8080/ndk/".into(),
            ..Default::default()
        };
        let archive = resolve_archive(RecipeVariant::R19c, &linux(), &mirrored).unwrap();
        assert_eq!(archive.url, "http://127.0.0.1:8080/ndk/android-ndk-r19c-linux-x86_64.zip");
    }

    #[test]
    fn test_r19c_builtin_digests() {
        let config = AcquisitionConfig::default();
        for host in [linux(), HostPlatform::new(HostOs::Macos, "x86_64")] {
            let archive = resolve_archive(RecipeVariant::R19c, &host, &config).unwrap();
            let digest = archive.sha1.unwrap();
            assert_eq!(digest.len(), 40);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_resolve_unsupported_host() {
        let config = AcquisitionConfig::default();
        for host in [
            HostPlatform::new(HostOs::Linux, "aarch64"),
            HostPlatform::new(HostOs::Macos, "arm64"),
            HostPlatform::new(HostOs::Other("FreeBSD".into()), "x86_64"),
        ] {
            assert!(matches!(
                resolve_archive(RecipeVariant::R19c, &host, &config),
                Err(AcquisitionError::UnsupportedHostPlatform(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_acquire_unsupported_host_makes_no_request() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = NdkDownloader::new(AcquisitionConfig::default()).unwrap();
        let host = HostPlatform::new(HostOs::Linux, "riscv64");
        let package_dir = dir.path().join("pkg");

        let result = downloader
            .acquire(RecipeVariant::R19b, &host, &package_dir, None)
            .await;
        assert!(matches!(result, Err(AcquisitionError::UnsupportedHostPlatform(_))));
        assert!(!package_dir.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_acquire_missing_digest_fails_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let config = AcquisitionConfig {
            verify_checksum: Some(true),
            ..Default::default()
        };
        let downloader = NdkDownloader::new(config).unwrap();
        let host = HostPlatform::new(HostOs::Windows, "x86");

        let result = downloader
            .acquire(RecipeVariant::R19c, &host, &dir.path().join("pkg"), None)
            .await;
        assert!(matches!(result, Err(AcquisitionError::MissingDigest(_))));
    }

    #[tokio::test]
    async fn test_acquire_stages_package() {
        let body = ndk_zip();
        let digest = sha1_hex(&body);
        let (base, hits) = serve(body, None).await;

        let mut config = AcquisitionConfig {
            mirror: base,
            verify_checksum: Some(true),
            ..Default::default()
        };
        config.sha1.insert("linux-x86_64".into(), digest);

        let dir = tempfile::tempdir().unwrap();
        let package_dir = dir.path().join("android-ndk-r19b").join("linux-x86_64");
        let downloader = NdkDownloader::new(config).unwrap();
        let path = downloader
            .acquire(RecipeVariant::R19b, &linux(), &package_dir, None)
            .await
            .unwrap();
        assert_eq!(path, package_dir);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let layout = PackageLayout::new(&package_dir, RecipeVariant::R19b, linux());
        assert!(crate::stage::StagedPackage::exists(&layout));
        assert!(Path::new(&layout.tool("clang")).is_file());
        assert!(Path::new(&layout.bundled_toolchain_file()).is_file());
        let experimental = Path::new(&layout.sysroot()).join("usr/include/c++/v1/experimental");
        assert!(!experimental.join("optional").exists());

        // the work directory is gone, only the package remains
        let siblings: Vec<_> = std::fs::read_dir(package_dir.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(siblings, vec![std::ffi::OsString::from("linux-x86_64")]);
    }

    #[tokio::test]
    async fn test_acquire_integrity_failure_leaves_nothing() {
        let (base, hits) = serve(ndk_zip(), None).await;
        let mut config = AcquisitionConfig {
            mirror: base,
            verify_checksum: Some(true),
            ..Default::default()
        };
        config
            .sha1
            .insert("linux-x86_64".into(), "0000000000000000000000000000000000000000".into());

        let dir = tempfile::tempdir().unwrap();
        let package_dir = dir.path().join("android-ndk-r19b").join("linux-x86_64");
        let downloader = NdkDownloader::new(config).unwrap();
        let result = downloader
            .acquire(RecipeVariant::R19b, &linux(), &package_dir, None)
            .await;

        assert!(matches!(result, Err(AcquisitionError::Integrity { .. })));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!package_dir.exists());
        let parent = package_dir.parent().unwrap();
        assert_eq!(std::fs::read_dir(parent).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_slow_transfer_is_not_cut_off() {
        let (base, _) = serve(b"ndk!".to_vec(), Some(Duration::from_millis(700))).await;
        let config = AcquisitionConfig {
            connect_timeout_secs: 1,
            ..Default::default()
        };
        let downloader = NdkDownloader::new(config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("archive.zip");
        downloader
            .download_file(&format!("{}/archive.zip", base), &target, None)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"ndk!");
    }

    #[test]
    fn test_digest_override() {
        let mut config = AcquisitionConfig::default();
        config.sha1.insert("windows-x86".into(), "0123".into());
        let host = HostPlatform::new(HostOs::Windows, "x86");

        let archive = resolve_archive(RecipeVariant::R19c, &host, &config).unwrap();
        assert_eq!(archive.sha1.as_deref(), Some("0123"));

        let linux = HostPlatform::new(HostOs::Linux, "x86_64");
        let archive = resolve_archive(RecipeVariant::R19c, &linux, &config).unwrap();
        assert_eq!(
            archive.sha1.as_deref(),
            Some("fd94d0be6017c6acbd193eb95e09cf4b6f61b834")
        );
    }

    #[tokio::test]
    async fn test_verify_sha1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, b"abc").unwrap();

        verify_sha1(&path, "a9993e364706816aba3e25717850c26c9cd0d89d").await.unwrap();
        verify_sha1(&path, "A9993E364706816ABA3E25717850C26C9CD0D89D").await.unwrap();

        let err = verify_sha1(&path, "0000000000000000000000000000000000000000")
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Integrity { .. }));
    }

    #[tokio::test]
    async fn test_extract_zip_keeps_modes_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("ndk.zip");

        {
            let file = std::fs::File::create(&archive).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let exec = zip::write::FileOptions::default().unix_permissions(0o755);
            zip.add_directory("android-ndk-r19b/bin/", exec).unwrap();
            zip.start_file("android-ndk-r19b/bin/clang", exec).unwrap();
            zip.write_all(b"#!/bin/sh\n").unwrap();
            zip.add_symlink("android-ndk-r19b/bin/clang++", "clang", exec).unwrap();
            zip.finish().unwrap();
        }

        let out = dir.path().join("out");
        extract_zip(&archive, &out).await.unwrap();

        let clang = out.join("android-ndk-r19b/bin/clang");
        assert_eq!(std::fs::read(&clang).unwrap(), b"#!/bin/sh\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&clang).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);

            let link = out.join("android-ndk-r19b/bin/clang++");
            assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from("clang"));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_refuses_links_out_of_target() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        std::fs::create_dir(&outside).unwrap();
        let opts = zip::write::FileOptions::default().unix_permissions(0o644);

        // absolute link, then a file written through it
        let absolute = dir.path().join("absolute.zip");
        {
            let mut zip = zip::ZipWriter::new(std::fs::File::create(&absolute).unwrap());
            zip.add_symlink("android-ndk-r19b/evil", outside.to_str().unwrap(), opts).unwrap();
            zip.start_file("android-ndk-r19b/evil/pwned", opts).unwrap();
            zip.write_all(b"x").unwrap();
            zip.finish().unwrap();
        }
        let result = extract_zip(&absolute, &dir.path().join("out-absolute")).await;
        assert!(matches!(result, Err(AcquisitionError::Extraction(_))));

        // relative link climbing above the root
        let climbing = dir.path().join("climbing.zip");
        {
            let mut zip = zip::ZipWriter::new(std::fs::File::create(&climbing).unwrap());
            zip.add_symlink("android-ndk-r19b/evil", "../../outside", opts).unwrap();
            zip.finish().unwrap();
        }
        let result = extract_zip(&climbing, &dir.path().join("out-climbing")).await;
        assert!(matches!(result, Err(AcquisitionError::Extraction(_))));

        // a link inside the root is kept, but nothing is written through it
        let inner = dir.path().join("inner.zip");
        {
            let mut zip = zip::ZipWriter::new(std::fs::File::create(&inner).unwrap());
            zip.add_directory("android-ndk-r19b/lib/", opts).unwrap();
            zip.add_symlink("android-ndk-r19b/lib64", "lib", opts).unwrap();
            zip.start_file("android-ndk-r19b/lib64/libfoo.so", opts).unwrap();
            zip.write_all(b"x").unwrap();
            zip.finish().unwrap();
        }
        let out = dir.path().join("out-inner");
        let result = extract_zip(&inner, &out).await;
        assert!(matches!(result, Err(AcquisitionError::Extraction(_))));
        assert!(!out.join("android-ndk-r19b/lib/libfoo.so").exists());

        assert_eq!(std::fs::read_dir(&outside).unwrap().count(), 0);
    }

    #[test]
    fn test_link_stays_inside() {
        let link = Path::new("android-ndk-r19b/toolchains/bin/clang++");
        assert!(link_stays_inside(link, "clang"));
        assert!(link_stays_inside(link, "../../lib/libc++.so"));
        assert!(link_stays_inside(link, "../../../README"));
        assert!(!link_stays_inside(link, "../../../../etc/passwd"));
        assert!(!link_stays_inside(link, "/etc/passwd"));
    }
}
