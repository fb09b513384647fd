use crate::error::{ReportError, Result};
use std::path::{Path, PathBuf};

const SYSTEM_DIRS: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

/// Canonicalises `path` and requires it to be a directory outside system locations.
pub fn canonical_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path.canonicalize().map_err(|e| {
        ReportError::Config(format!("Invalid project path '{}': {e}", path.display()))
    })?;

    if !canonical.is_dir() {
        return Err(ReportError::Config(format!(
            "Project path '{}' is not a directory",
            canonical.display()
        )));
    }

    if let Some(dir) = SYSTEM_DIRS
        .iter()
        .find(|dir| canonical.starts_with(dir))
    {
        return Err(ReportError::Config(format!(
            "Refusing to use system directory '{dir}'"
        )));
    }

    Ok(canonical)
}

/// ProjectScannerAgent checks that the project is a Go module root
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Returns the canonical module root.
    pub fn validate(&self) -> Result<PathBuf> {
        let project_path = canonical_dir(&self.project_path)?;

        // `go list -m` needs a module root
        if !project_path.join("go.mod").is_file() {
            return Err(ReportError::DependencyList(format!(
                "go.mod not found in '{}'",
                project_path.display()
            )));
        }

        Ok(project_path)
    }
}
