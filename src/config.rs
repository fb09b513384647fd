use crate::cli::Cli;
use crate::error::{ReportError, Result};
use std::path::PathBuf;
use url::Url;

/// File name of the report, both locally and on the publishing branch.
pub const REPORT_FILE: &str = "dependencies.md";

pub const COMMIT_MESSAGE: &str = "Update dependency report";

/// Disables checksum-database lookups for the module listing.
pub const CHECKSUM_TOGGLE: (&str, &str) = ("GOSUMDB", "off");

pub const CREDENTIAL_VAR: &str = "GITHUB_TOKEN";

/// Validated settings for a single report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub project_path: PathBuf,
    pub project_name: String,
    pub repository_url: Url,
    pub branch: String,
    pub remote: String,
    pub go_binary: String,
    pub formatter: Option<String>,
    pub credential: Option<String>,
}

impl ReportConfig {
    /// Builds the run configuration; the credential is only ever read from
    /// the environment.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::build(cli, std::env::var(CREDENTIAL_VAR).ok())
    }

    fn build(cli: &Cli, credential: Option<String>) -> Result<Self> {
        let repository_url = Url::parse(cli.repository_url.trim()).map_err(|e| {
            ReportError::Config(format!(
                "Invalid repository URL '{}': {e}",
                cli.repository_url
            ))
        })?;
        if !matches!(repository_url.scheme(), "http" | "https") {
            return Err(ReportError::Config(format!(
                "Repository URL must use http or https, got '{}'",
                repository_url.scheme()
            )));
        }

        validate_ref_name("branch", &cli.branch)?;
        validate_ref_name("remote", &cli.remote)?;

        Ok(Self {
            output_dir: normalize_output_dir(&cli.output_path),
            project_path: PathBuf::from(&cli.path),
            project_name: cli.project_name.clone(),
            repository_url,
            branch: cli.branch.clone(),
            remote: cli.remote.clone(),
            go_binary: cli.go_binary.clone(),
            formatter: cli.formatter.clone().filter(|f| !f.trim().is_empty()),
            credential: credential.filter(|t| !t.is_empty()),
        })
    }

    /// Link to `commit` on the hosted repository.
    pub fn commit_link(&self, commit: &str) -> String {
        format!(
            "{}/commit/{commit}",
            self.repository_url.as_str().trim_end_matches('/')
        )
    }
}

/// An empty output path means the current directory.
fn normalize_output_dir(raw: &str) -> PathBuf {
    if raw.trim().is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(raw)
    }
}

fn validate_ref_name(kind: &str, name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('-')
        || name.contains("..")
        || name.chars().any(|c| c.is_whitespace() || c.is_control());

    if invalid {
        return Err(ReportError::Config(format!("Invalid {kind} name '{name}'")));
    }
    Ok(())
}
