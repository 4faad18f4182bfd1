//! Architecture Lookup Tables
//!
//! The only place architecture strings are spelled out. Everything that
//! needs an ABI directory, sysroot name or triple asks an `AbiTriple`.

use ndk_recipe_core::Arch;

/// Android ABI name, as used for `lib/<abi>` directories
pub fn android_abi(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "x86",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "armeabi-v7a",
        Arch::Armv8 => "arm64-v8a",
    }
}

/// Architecture directory name inside the sysroot
pub fn sysroot_abi(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "x86",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "arm",
        Arch::Armv8 => "arm64",
    }
}

/// CPU part of the target triples
pub fn triple_prefix(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "i686",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "arm",
        Arch::Armv8 => "aarch64",
    }
}

/// CPU part of the `--target` triple. Clang wants the ARM ISA version spelled out.
pub fn llvm_triple_prefix(arch: Arch) -> &'static str {
    match arch {
        Arch::Armv7 => "armv7",
        other => triple_prefix(other),
    }
}

/// Environment part of the target triples
pub fn eabi_suffix(arch: Arch) -> &'static str {
    match arch {
        Arch::Armv7 => "androideabi",
        _ => "android",
    }
}

/// Triple naming sysroot header/library directories and binutils prefixes
pub fn header_triple(arch: Arch) -> String {
    format!("{}-linux-{}", triple_prefix(arch), eabi_suffix(arch))
}

/// Name of the GCC toolchain directory (without the `-4.9` suffix)
pub fn toolchain_triple(arch: Arch) -> String {
    if arch.is_x86_family() {
        android_abi(arch).to_string()
    } else {
        header_triple(arch)
    }
}

/// Names derived from a target architecture and API level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiTriple {
    pub arch: Arch,
    pub api_level: u32,
}

impl AbiTriple {
    pub fn new(arch: Arch, api_level: u32) -> Self {
        Self { arch, api_level }
    }

    pub fn android_abi(&self) -> &'static str {
        android_abi(self.arch)
    }

    pub fn sysroot_abi(&self) -> &'static str {
        sysroot_abi(self.arch)
    }

    /// `--target` value, e.g. `armv7-none-linux-androideabi21`
    pub fn llvm_triple(&self) -> String {
        format!(
            "{}-none-linux-{}{}",
            llvm_triple_prefix(self.arch),
            eabi_suffix(self.arch),
            self.api_level
        )
    }

    pub fn header_triple(&self) -> String {
        header_triple(self.arch)
    }

    pub fn toolchain_triple(&self) -> String {
        toolchain_triple(self.arch)
    }
}
