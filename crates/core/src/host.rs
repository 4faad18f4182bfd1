//! Host Platform
//!
//! The build machine the NDK runs on. Detection lives here, but every
//! consumer takes a `HostPlatform` as a parameter so tests can supply
//! synthetic hosts.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Build machine operating system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostOs {
    Windows,
    Macos,
    Linux,
    Other(String),
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Windows => f.write_str("Windows"),
            HostOs::Macos => f.write_str("Macos"),
            HostOs::Linux => f.write_str("Linux"),
            HostOs::Other(name) => f.write_str(name),
        }
    }
}

/// Build machine description
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPlatform {
    pub os: HostOs,
    /// CPU architecture as the OS reports it (`x86_64`, `AMD64`, `x86`, ...)
    pub machine: String,
}

impl HostPlatform {
    pub fn new(os: HostOs, machine: impl Into<String>) -> Self {
        Self {
            os,
            machine: machine.into(),
        }
    }

    /// Describe the machine this process runs on
    pub fn detect() -> Self {
        let os = match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "macos" => HostOs::Macos,
            "linux" => HostOs::Linux,
            other => HostOs::Other(other.to_string()),
        };

        // Windows reports 64-bit x86 as AMD64
        let machine = match (&os, std::env::consts::ARCH) {
            (HostOs::Windows, "x86_64") => "AMD64".to_string(),
            (_, arch) => arch.to_string(),
        };

        Self { os, machine }
    }

    fn is_x86_64(&self) -> bool {
        self.machine == "x86_64" || self.machine == "AMD64"
    }

    /// Name of the NDK prebuilt directory for this host
    pub fn tag(&self) -> &'static str {
        match self.os {
            HostOs::Windows if self.is_x86_64() => "windows-x86_64",
            HostOs::Windows => "windows",
            HostOs::Macos => "darwin-x86_64",
            _ => "linux-x86_64",
        }
    }

    /// Suffix of host executables
    pub fn exe_suffix(&self) -> &'static str {
        if self.os == HostOs::Windows {
            ".exe"
        } else {
            ""
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_tags() {
        assert_eq!(HostPlatform::new(HostOs::Windows, "AMD64").tag(), "windows-x86_64");
        assert_eq!(HostPlatform::new(HostOs::Windows, "x86").tag(), "windows");
        assert_eq!(HostPlatform::new(HostOs::Macos, "x86_64").tag(), "darwin-x86_64");
        assert_eq!(HostPlatform::new(HostOs::Linux, "x86_64").tag(), "linux-x86_64");
    }

    #[test]
    fn test_exe_suffix() {
        assert_eq!(HostPlatform::new(HostOs::Windows, "x86").exe_suffix(), ".exe");
        assert_eq!(HostPlatform::new(HostOs::Linux, "x86_64").exe_suffix(), "");
    }

    #[test]
    fn test_detect_is_consistent() {
        let host = HostPlatform::detect();
        assert_eq!(host, HostPlatform::detect());
        assert!(!host.machine.is_empty());
    }
}
