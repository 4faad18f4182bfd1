//! Environment Exports
//!
//! The variables a consuming build needs to use the packaged toolchain.
//! They are returned as a value; nothing here touches the process
//! environment. Callers apply them to the commands they spawn.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{info, debug};

/// Variables exported to a consuming build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentExports {
    vars: BTreeMap<String, String>,
    path_additions: Vec<String>,
}

impl EnvironmentExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Add a directory to prepend to PATH
    pub fn add_to_path(&mut self, dir: impl Into<String>) {
        let dir = dir.into();
        if !self.path_additions.contains(&dir) {
            self.path_additions.push(dir);
        }
    }

    pub fn path_additions(&self) -> &[String] {
        &self.path_additions
    }

    /// PATH with the additions prepended to `inherited`
    pub fn path_value(&self, inherited: Option<&OsString>) -> OsString {
        let sep = if cfg!(windows) { ";" } else { ":" };
        let mut path = OsString::from(self.path_additions.join(sep));

        match inherited {
            Some(original) if !original.is_empty() => {
                if !self.path_additions.is_empty() {
                    path.push(sep);
                }
                path.push(original);
            }
            _ => {}
        }
        path
    }

    /// Set every exported variable, and the extended PATH, on `command`
    pub fn apply_to(&self, command: &mut Command) {
        command.envs(&self.vars);
        if !self.path_additions.is_empty() {
            let inherited = std::env::var_os("PATH");
            command.env("PATH", self.path_value(inherited.as_ref()));
        }
        debug!("Applied {} exported variables to command", self.vars.len());
    }

    /// Shell export commands (for terminal display)
    pub fn shell_exports(&self) -> String {
        let mut exports = String::new();

        for (key, value) in &self.vars {
            if cfg!(windows) {
                exports.push_str(&format!("set {}={}\n", key, value));
            } else {
                exports.push_str(&format!("export {}=\"{}\"\n", key, value.replace('"', "\\\"")));
            }
        }

        if !self.path_additions.is_empty() {
            if cfg!(windows) {
                exports.push_str(&format!("set PATH={};%PATH%\n", self.path_additions.join(";")));
            } else {
                exports.push_str(&format!("export PATH=\"{}:$PATH\"\n", self.path_additions.join(":")));
            }
        }

        exports
    }

    /// `KEY=value` lines
    pub fn dotenv(&self) -> String {
        let mut content = String::from("# Android NDK toolchain environment\n\n");
        for (key, value) in &self.vars {
            content.push_str(&format!("{}={}\n", key, value));
        }
        content
    }
}

/// Environment file writer
pub struct EnvFileWriter;

impl EnvFileWriter {
    /// Write a .env file
    pub async fn write_dotenv(path: &Path, env: &EnvironmentExports) -> std::io::Result<()> {
        tokio::fs::write(path, env.dotenv()).await?;
        info!("Wrote environment to {:?}", path);
        Ok(())
    }

    /// Write a shell script for environment setup
    pub async fn write_shell_script(path: &Path, env: &EnvironmentExports) -> std::io::Result<()> {
        let mut content = if cfg!(windows) {
            "@echo off\nREM Android NDK toolchain environment\n\n".to_string()
        } else {
            "#!/bin/sh\n# Android NDK toolchain environment\n\n".to_string()
        };

        content.push_str(&env.shell_exports());

        tokio::fs::write(path, content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = tokio::fs::metadata(path).await?.permissions();
            perms.set_mode(0o755);
            tokio::fs::set_permissions(path, perms).await?;
        }

        info!("Wrote shell script to {:?}", path);
        Ok(())
    }
}
