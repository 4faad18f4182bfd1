//! Flag Deriver
//!
//! Computes compiler and linker flags plus exported variables for one
//! validated target. The flags follow the NDK's `android.toolchain.cmake`,
//! in the same order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ndk_recipe_core::{Arch, BuildType, StlLinkage, TargetConfig};

use crate::env::EnvironmentExports;
use crate::layout::PackageLayout;
use crate::tables::AbiTriple;

/// Targets below this level link android_support for libc pieces libc++ needs
const ANDROID_SUPPORT_BELOW_API: u32 = 21;

/// x86 targets below this level do not guarantee stack alignment
const X86_STACK_REALIGN_BELOW_API: u32 = 24;

/// Compiler and linker flags for a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    /// Used for C, C++ and assembler sources
    pub compiler_flags: Vec<String>,
    /// Used when linking shared libraries
    pub shared_linker_flags: Vec<String>,
    /// The shared set plus position independent executable flags
    pub executable_linker_flags: Vec<String>,
}

/// Result of one configuration pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub flags: FlagSet,
    /// Variables for the consuming build's environment
    pub env: EnvironmentExports,
}

/// Derives flags for targets built against a staged package
pub struct FlagDeriver<'a> {
    layout: &'a PackageLayout,
}

impl<'a> FlagDeriver<'a> {
    /// Deriver for targets built against `layout`
    pub fn new(layout: &'a PackageLayout) -> Self {
        Self { layout }
    }

    /// Flags and exports for `target`
    pub fn derive(&self, target: &TargetConfig) -> PackageInfo {
        let triple = AbiTriple::new(target.arch, target.api_level);
        let flags = self.flag_set(target, &triple);
        let env = self.exports(target, &triple, &flags);

        debug!(
            "Derived {} compiler and {} linker flags for {}",
            flags.compiler_flags.len(),
            flags.shared_linker_flags.len(),
            triple.llvm_triple()
        );

        PackageInfo { flags, env }
    }

    fn sysroot_lib(&self, triple: &AbiTriple) -> String {
        format!("{}/usr/lib/{}", self.layout.sysroot(), triple.header_triple())
    }

    pub fn flag_set(&self, target: &TargetConfig, triple: &AbiTriple) -> FlagSet {
        let compiler_flags = self.compiler_flags(target, triple);
        let mut shared_linker_flags = self.linker_flags(target, triple);

        let mut executable_linker_flags = shared_linker_flags.clone();
        executable_linker_flags.extend(
            ["-Wl,--gc-sections", "-Wl,-z,nocopyreloc", "-pie"].map(String::from),
        );
        let pie = if target.arch.is_x86_family() { "-fPIE" } else { "-fpie" };
        executable_linker_flags.push(pie.to_string());

        if self.layout.variant().uses_lld() {
            let fuse_ld = format!("-fuse-ld={}", self.layout.tool("ld.lld"));
            shared_linker_flags.push(fuse_ld.clone());
            executable_linker_flags.push(fuse_ld);
        }

        FlagSet {
            compiler_flags,
            shared_linker_flags,
            executable_linker_flags,
        }
    }

    fn compiler_flags(&self, target: &TargetConfig, triple: &AbiTriple) -> Vec<String> {
        let sysroot = self.layout.sysroot();
        let include = format!("{}/usr/include", sysroot);

        // C library headers go last, libc++ reaches them with #include_next
        let mut flags = vec![format!("-isystem {}/c++/v1", include)];
        if target.api_level < ANDROID_SUPPORT_BELOW_API {
            flags.push(format!("-isystem {}", self.layout.android_support_include()));
        }
        flags.push(format!("-isystem {}", include));
        flags.push(format!("-isystem {}/{}", include, triple.header_triple()));

        flags.push(format!("--target={}", triple.llvm_triple()));
        flags.push(format!("--sysroot={}", sysroot));
        flags.extend(
            [
                "-g",
                "-DANDROID",
                "-ffunction-sections",
                "-fdata-sections",
                "-funwind-tables",
                "-fstack-protector-strong",
                "-no-canonical-prefixes",
            ]
            .map(String::from),
        );
        flags.push(format!("--gcc-toolchain={}", self.layout.binutils(target.arch)));

        if let Some(arm) = target.arm {
            if arm.neon {
                flags.push("-mfpu=neon".to_string());
            }
            flags.extend(["-march=armv7-a", "-mfloat-abi=softfp", "-mfpu=vfpv3-d16"].map(String::from));
            flags.push(format!("-m{}", arm.mode.as_str()));
        } else if target.arch == Arch::X86 && target.api_level < X86_STACK_REALIGN_BELOW_API {
            flags.push("-mstackrealign".to_string());
        }

        flags.push("-Wa,--noexecstack".to_string());

        match target.build_type {
            BuildType::Debug => {
                flags.extend(["-O0", "-fno-limit-debug-info"].map(String::from));
            }
            BuildType::Release => {
                flags.push("-DNDEBUG".to_string());
                let opt = if target.arch == Arch::Armv7 { "-Oz" } else { "-O2" };
                flags.push(opt.to_string());
            }
        }

        flags.extend(["-Wformat", "-Werror=format-security"].map(String::from));
        flags
    }

    fn linker_flags(&self, target: &TargetConfig, triple: &AbiTriple) -> Vec<String> {
        let sysroot_lib = self.sysroot_lib(triple);
        let armv7 = target.arch == Arch::Armv7;

        // Do not re-export libgcc symbols in every binary
        let mut flags: Vec<String> = vec![
            "-Wl,--exclude-libs,libgcc.a".to_string(),
            "-Wl,--exclude-libs,libatomic.a".to_string(),
            format!("--target={}", triple.llvm_triple()),
            format!("--gcc-toolchain={}", self.layout.binutils(target.arch)),
            format!("-L{}/{}", sysroot_lib, target.api_level),
            format!("-L{}", sysroot_lib),
            "-nostdlib++".to_string(),
            format!("--sysroot={}", self.layout.sysroot()),
        ];

        flags.extend(stl_flags(target.stl, armv7).iter().map(|f| f.to_string()));
        flags.extend(["-latomic", "-lm"].map(String::from));
        if target.api_level < ANDROID_SUPPORT_BELOW_API {
            flags.push("-landroid_support".to_string());
        }

        flags.extend(
            [
                "-Wl,-z,relro",
                "-Wl,-z,now",
                "-Wl,-z,noexecstack",
                "-Qunused-arguments",
                "-Wl,--build-id",
                "-Wl,--warn-shared-textrel",
                "-Wl,--fatal-warnings",
                "-Wl,--no-undefined",
            ]
            .map(String::from),
        );

        if armv7 {
            flags.push("-Wl,--exclude-libs,libunwind.a".to_string());
            if self.layout.variant().fixes_cortex_a8() {
                flags.push("-Wl,--fix-cortex-a8".to_string());
            }
        }
        flags
    }

    fn exports(&self, target: &TargetConfig, triple: &AbiTriple, flags: &FlagSet) -> EnvironmentExports {
        let layout = self.layout;
        let header_triple = triple.header_triple();
        let clang = layout.tool("clang");
        let clangxx = layout.tool("clang++");
        let cflags = flags.compiler_flags.join(" ");

        let mut env = EnvironmentExports::new();
        env.add_to_path(layout.llvm_bin());

        env.set("CC", clang.clone());
        env.set("CXX", clangxx.clone());
        env.set("CPP", format!("{} -E", clangxx));
        env.set("CCAS", clang.clone());
        env.set("LD", clang);
        for (var, tool) in [("AR", "ar"), ("RANLIB", "ranlib"), ("NM", "nm"), ("STRIP", "strip")] {
            env.set(var, layout.tool(&format!("{}-{}", header_triple, tool)));
        }

        env.set("CFLAGS", cflags.clone());
        env.set("CPPFLAGS", cflags.clone());
        env.set("CXXFLAGS", cflags.clone());
        env.set("ASFLAGS", cflags);
        // No conventional variable exists for executable link flags
        env.set("LDFLAGS", flags.shared_linker_flags.join(" "));

        if let Some(arm) = target.arm {
            env.set("ANDROID_ARM_MODE", arm.mode.as_str());
            if arm.neon {
                env.set("ANDROID_ARM_NEON", "TRUE");
            }
        }
        env.set("ANDROID_STL", format!("c++_{}", target.stl.as_str()));
        env.set("ANDROID_ABI", triple.android_abi());
        env.set("ANDROID_SYSROOT_ABI", triple.sysroot_abi());
        env.set("ANDROID_NATIVE_API_LEVEL", target.api_level.to_string());
        env.set("ANDROID_NDK_TOOLCHAIN", layout.ndk_cmake_toolchain());
        env.set("CMAKE_TOOLCHAIN_FILE", layout.bundled_toolchain_file());
        env.set("CMAKE_FIND_ROOT_PATH", layout.sysroot());
        env
    }
}

/// C++ runtime libraries to link
fn stl_flags(stl: StlLinkage, armv7: bool) -> &'static [&'static str] {
    match (stl, armv7) {
        (StlLinkage::Static, true) => &["-lc++_static", "-lc++abi", "-lunwind", "-ldl"],
        (StlLinkage::Static, false) => &["-lc++_static", "-lc++abi"],
        (StlLinkage::Shared, true) => &["-lc++_shared", "-lunwind"],
        (StlLinkage::Shared, false) => &["-lc++_shared"],
    }
}
