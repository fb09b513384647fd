use crate::config::REPORT_FILE;
use crate::error::{ReportError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// ReportWriter replaces the report file inside a directory
pub struct ReportWriter;

impl ReportWriter {
    /// Writes `content` to `<dir>/dependencies.md`, replacing any previous report.
    pub fn write(dir: &Path, content: &str) -> Result<PathBuf> {
        let target = dir.join(REPORT_FILE);
        Self::write_file(&target, content)?;
        Ok(target)
    }

    pub fn write_file(target: &Path, content: &str) -> Result<()> {
        match fs::remove_file(target) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ReportError::io(
                    format!("remove previous report '{}'", target.display()),
                    e,
                ));
            }
        }

        fs::write(target, content)
            .map_err(|e| ReportError::io(format!("writing report '{}'", target.display()), e))
    }
}
