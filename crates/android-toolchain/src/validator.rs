//! Configuration Validator
//!
//! Rejects settings the NDK cannot build for, before anything is downloaded
//! or derived. The NDK's own CMake toolchain silently raises low API levels;
//! here they are errors so the settings always describe the actual build.

use tracing::debug;

use ndk_recipe_core::{
    Arch, ArmOptions, ConfigurationError, HostOs, HostPlatform, Options, Settings, TargetConfig,
};

/// Lowest API level the recipe builds for
pub const MIN_API_LEVEL: u32 = 16;
/// Lowest API level for 64-bit targets
pub const MIN_API_LEVEL_64BIT: u32 = 21;

/// Check `settings` against the NDK's constraints and produce a typed target.
///
/// Rules are checked in a fixed order and the first violation is returned.
pub fn validate(
    settings: &Settings,
    options: &Options,
    host: &HostPlatform,
) -> Result<TargetConfig, ConfigurationError> {
    let api_level = settings.api_level;

    if api_level < MIN_API_LEVEL {
        return Err(ConfigurationError::MinimumApiLevel { api_level });
    }
    let is_64bit = settings.arch.parse::<Arch>().map_or(false, |arch| arch.is_64bit());
    if api_level < MIN_API_LEVEL_64BIT && is_64bit {
        return Err(ConfigurationError::Bitness64ApiLevel {
            arch: settings.arch.clone(),
            api_level,
        });
    }
    if settings.compiler != "clang" || settings.compiler_version != "8" {
        return Err(ConfigurationError::UnsupportedCompiler {
            compiler: settings.compiler.clone(),
            version: settings.compiler_version.clone(),
        });
    }
    if let HostOs::Other(name) = &host.os {
        return Err(ConfigurationError::UnsupportedHostOs(name.clone()));
    }
    let host_arch_ok = matches!(host.machine.as_str(), "x86_64" | "AMD64")
        || (host.os == HostOs::Windows && host.machine == "x86");
    if !host_arch_ok {
        return Err(ConfigurationError::UnsupportedHostArch(host.machine.clone()));
    }
    if settings.os != "Android" {
        return Err(ConfigurationError::WrongTargetOs(settings.os.clone()));
    }
    let arch: Arch = settings.arch.parse()?;

    let arm = (arch == Arch::Armv7).then(|| ArmOptions {
        mode: options.arm_mode,
        neon: options.neon,
    });

    debug!("Validated {} API {} on {}", arch, api_level, host);

    Ok(TargetConfig {
        arch,
        api_level,
        build_type: settings.build_type,
        stl: options.libcxx,
        arm,
    })
}
