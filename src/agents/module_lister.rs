use crate::agents::environment::ListerEnvironment;
use crate::agents::project_scanner::ProjectScannerAgent;
use crate::error::{ReportError, Result};
use crate::modules::{DependencyRecord, GoModule};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Produces the structured dependency listing for a project.
pub trait ModuleLister {
    fn list(&self, env: &ListerEnvironment) -> Result<ModuleListing>;
}

/// Raw lister output kept in a temporary file for the formatter passes,
/// together with the parsed records. The file is removed on drop.
#[derive(Debug)]
pub struct ModuleListing {
    file: NamedTempFile,
    records: Vec<DependencyRecord>,
}

impl ModuleListing {
    /// Parses a `go list -m -json` stream and persists it to a temp file.
    pub fn from_json(raw: &str) -> Result<Self> {
        let raw = raw.trim_end_matches(['\n', '\r']);
        let mut records = Vec::new();
        for module in serde_json::Deserializer::from_str(raw).into_iter::<GoModule>() {
            let module = module.map_err(|e| {
                ReportError::DependencyList(format!("malformed module listing: {e}"))
            })?;
            records.extend(module.to_record());
        }

        let mut file = tempfile::Builder::new()
            .prefix("modules-")
            .tempfile()
            .map_err(|e| ReportError::io("creating temp file", e))?;
        file.write_all(raw.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| ReportError::io("writing to temp file", e))?;

        Ok(Self { file, records })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn records(&self) -> &[DependencyRecord] {
        &self.records
    }
}

/// GoModuleLister runs `go list` against the project's module graph
pub struct GoModuleLister {
    go_binary: String,
    project_path: PathBuf,
}

impl GoModuleLister {
    pub fn new<P: AsRef<Path>>(go_binary: impl Into<String>, project_path: P) -> Self {
        Self {
            go_binary: go_binary.into(),
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    fn args() -> [&'static str; 6] {
        ["list", "--mod=mod", "-u", "-m", "-json", "all"]
    }

    fn spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Resolving module versions...");
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

impl ModuleLister for GoModuleLister {
    fn list(&self, env: &ListerEnvironment) -> Result<ModuleListing> {
        let module_root = ProjectScannerAgent::new(&self.project_path).validate()?;
        tracing::debug!(
            "Executing: {} {} (in {})",
            self.go_binary,
            Self::args().join(" "),
            module_root.display()
        );

        let mut command = Command::new(&self.go_binary);
        command.current_dir(&module_root).args(Self::args());
        env.apply(&mut command);

        let pb = Self::spinner();
        let output = command.output();
        pb.finish_and_clear();

        let output = output.map_err(|e| {
            ReportError::DependencyList(format!(
                "Failed to execute '{}': {e}",
                self.go_binary
            ))
        })?;

        if !output.status.success() {
            return Err(ReportError::DependencyList(format!(
                "listing go modules exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            ReportError::DependencyList(format!("module listing is not valid UTF-8: {e}"))
        })?;
        let listing = ModuleListing::from_json(&stdout)?;
        tracing::debug!("Listed {} modules", listing.records().len());
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LISTING: &str = r#"{
        "Path": "github.com/cri-o/cri-o",
        "Main": true
}
{
        "Path": "github.com/pkg/errors",
        "Version": "v0.8.1",
        "Update": {"Path": "github.com/pkg/errors", "Version": "v0.9.1"}
}
{
        "Path": "golang.org/x/sys",
        "Version": "v0.1.0",
        "Indirect": true
}
"#;

    #[test]
    fn parses_concatenated_module_stream() {
        let listing = ModuleListing::from_json(LISTING).unwrap();
        let paths: Vec<_> = listing.records().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["github.com/pkg/errors", "golang.org/x/sys"]);
        assert_eq!(
            fs::read_to_string(listing.path()).unwrap(),
            LISTING.trim_end()
        );
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let listing = ModuleListing::from_json(LISTING).unwrap();
        let path = listing.path().to_path_buf();
        assert!(path.exists());
        drop(listing);
        assert!(!path.exists());
    }

    #[test]
    fn malformed_listing_is_a_listing_error() {
        let err = ModuleListing::from_json("{\"Path\": ").unwrap_err();
        assert!(matches!(err, ReportError::DependencyList(_)));
    }

    fn module_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/x\n").unwrap();
        dir
    }

    #[test]
    fn missing_binary_is_a_listing_error() {
        let dir = module_dir();
        let lister = GoModuleLister::new("definitely-not-a-go-binary", dir.path());
        let err = lister.list(&ListerEnvironment::default()).unwrap_err();
        assert!(matches!(err, ReportError::DependencyList(_)));
    }

    #[test]
    fn project_without_go_mod_is_a_listing_error() {
        let dir = tempfile::tempdir().unwrap();
        let lister = GoModuleLister::new("definitely-not-a-go-binary", dir.path());
        let err = lister.list(&ListerEnvironment::default()).unwrap_err();
        assert!(err.to_string().contains("go.mod not found"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_listing_error() {
        let dir = module_dir();
        let lister = GoModuleLister::new("false", dir.path());
        let err = lister.list(&ListerEnvironment::default()).unwrap_err();
        assert!(matches!(err, ReportError::DependencyList(_)));
    }

    #[cfg(unix)]
    #[test]
    fn child_process_sees_prepared_environment() {
        use crate::agents::environment::EnvironmentPreparer;
        use std::os::unix::fs::PermissionsExt;

        let dir = module_dir();
        let script = dir.path().join("fake-go");
        fs::write(
            &script,
            r#"#!/bin/sh
echo "{\"Path\":\"example.com/env\",\"Version\":\"$GOSUMDB\"}"
"#,
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let env = EnvironmentPreparer::lister_environment().unwrap();
        let lister = GoModuleLister::new(script.to_string_lossy(), dir.path());
        let listing = lister.list(&env).unwrap();

        assert_eq!(listing.records().len(), 1);
        assert_eq!(listing.records()[0].version, "off");
    }
}
