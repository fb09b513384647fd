use crate::error::{ReportError, Result};
use jiff::Zoned;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMMIT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{7,64}$").expect("valid commit hash pattern"));

/// Full hash of the commit a report was generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn parse(raw: &str) -> Result<Self> {
        let hash = raw.trim();
        if !COMMIT_HASH.is_match(hash) {
            return Err(ReportError::RepoState(format!(
                "get repository HEAD: '{hash}' is not a commit hash"
            )));
        }
        Ok(Self(hash.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, as shown in the generation line.
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formats `time` the way RFC 1123 dates appear in HTTP headers.
pub fn rfc1123(time: &Zoned) -> String {
    time.strftime("%a, %d %b %Y %H:%M:%S %Z").to_string()
}

/// ReportRenderer fills the fixed markdown template
pub struct ReportRenderer<'a> {
    project_name: &'a str,
    commit_link: String,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(project_name: &'a str, commit_link: String) -> Self {
        Self {
            project_name,
            commit_link,
        }
    }

    pub fn render(
        &self,
        generated_at: &Zoned,
        head: &CommitHash,
        outdated: &str,
        all: &str,
    ) -> String {
        format!(
            "# {project} Dependency Report

_Generated on {date} for commit [{short}][0]._

[0]: {link}

## Outdated Dependencies

{outdated}

## All Dependencies

{all}
",
            project = self.project_name,
            date = rfc1123(generated_at),
            short = head.short(),
            link = self.commit_link,
        )
    }
}
