use crate::config::CHECKSUM_TOGGLE;
use crate::error::{ReportError, Result};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Environment entries handed to the module lister's child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListerEnvironment {
    vars: Vec<(String, String)>,
}

impl ListerEnvironment {
    /// Adds `key=value`, rejecting names the OS cannot represent.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ReportError::Environment(format!(
                "Invalid environment variable name '{key}'"
            )));
        }
        if value.contains('\0') {
            return Err(ReportError::Environment(format!(
                "Value for '{key}' contains a NUL byte"
            )));
        }

        self.vars.retain(|(k, _)| k != key);
        self.vars.push((key.to_string(), value.to_string()));
        Ok(())
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn apply(&self, command: &mut Command) {
        for (key, value) in &self.vars {
            command.env(key, value);
        }
    }
}

/// EnvironmentPreparer readies the filesystem and lister environment
pub struct EnvironmentPreparer;

impl EnvironmentPreparer {
    /// Recursively creates the output directory; existing directories are fine.
    pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
        fs::create_dir_all(output_dir).map_err(|e| {
            ReportError::io(
                format!("create output path '{}'", output_dir.display()),
                e,
            )
        })
    }

    /// Environment for the module lister with checksum verification disabled.
    pub fn lister_environment() -> Result<ListerEnvironment> {
        let mut env = ListerEnvironment::default();
        let (key, value) = CHECKSUM_TOGGLE;
        env.set(key, value)
            .map_err(|e| ReportError::Environment(format!("disabling {key}: {e}")))?;
        Ok(env)
    }
}
