use crate::agents::project_scanner::canonical_dir;
use crate::agents::renderer::CommitHash;
use crate::error::{ReportError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Repository operations needed to read HEAD and publish the report.
pub trait ReportRepository {
    /// Root of the working tree.
    fn root(&self) -> &Path;
    fn head(&self) -> Result<CommitHash>;
    fn current_branch(&self) -> Result<String>;
    fn checkout(&self, branch: &str) -> Result<()>;
    /// Stages `file`, given relative to the repository root.
    fn add(&self, file: &str) -> Result<()>;
    fn commit(&self, message: &str) -> Result<()>;
    fn push(&self, remote: &str, branch: &str) -> Result<()>;
    /// Drops staged and working-tree changes to `file`, removing it when untracked.
    fn discard(&self, file: &str) -> Result<()>;
}

impl<T: ReportRepository + ?Sized> ReportRepository for &T {
    fn root(&self) -> &Path {
        (**self).root()
    }

    fn head(&self) -> Result<CommitHash> {
        (**self).head()
    }

    fn current_branch(&self) -> Result<String> {
        (**self).current_branch()
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        (**self).checkout(branch)
    }

    fn add(&self, file: &str) -> Result<()> {
        (**self).add(file)
    }

    fn commit(&self, message: &str) -> Result<()> {
        (**self).commit(message)
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        (**self).push(remote, branch)
    }

    fn discard(&self, file: &str) -> Result<()> {
        (**self).discard(file)
    }
}

/// VersionControlAgent drives the `git` CLI with hardened input validation.
pub struct VersionControlAgent {
    root: PathBuf,
}

impl VersionControlAgent {
    /// Opens the repository whose working tree contains `project_path`.
    pub fn open<P: AsRef<Path>>(project_path: P) -> Result<Self> {
        let project_path = Self::validate_git_path(project_path.as_ref())?;

        let output = Self::git_in(&project_path, &["rev-parse", "--show-toplevel"])?;
        Self::ensure_success(&output, "open local repo", ReportError::RepoState)?;

        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        let root = Self::validate_git_path(&root)
            .map_err(|e| ReportError::RepoState(format!("open local repo: {e}")))?;
        Ok(Self { root })
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        Self::git_in(&self.root, args)
    }

    fn git_in(dir: &Path, args: &[&str]) -> Result<Output> {
        tracing::debug!("Executing: git {} (in {})", args.join(" "), dir.display());
        Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .map_err(|e| {
                ReportError::RepoState(format!(
                    "Failed to execute git command '{}': {e}",
                    args.join(" ")
                ))
            })
    }

    /// Git writes some failures (`nothing to commit`) to stdout only.
    fn ensure_success(
        output: &Output,
        context: &str,
        error: fn(String) -> ReportError,
    ) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
            .unwrap_or("no output");
        let status = match output.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };

        Err(error(format!("{context}: {detail} ({status})")))
    }

    fn validate_git_path(path: &Path) -> Result<PathBuf> {
        let dangerous = [';', '|', '&', '$', '`', '\n', '\r'];
        let path_str = path.to_string_lossy();
        if let Some(ch) = dangerous.iter().find(|c| path_str.contains(**c)) {
            return Err(ReportError::RepoState(format!(
                "Path contains dangerous character: '{ch}'"
            )));
        }

        canonical_dir(path)
            .map_err(|err| ReportError::RepoState(format!("Invalid Git path: {err}")))
    }

    fn is_tracked(&self, file: &str) -> Result<bool> {
        let output = self.run_git(&["ls-files", "--error-unmatch", "--", file])?;
        Ok(output.status.success())
    }
}

impl ReportRepository for VersionControlAgent {
    fn root(&self) -> &Path {
        &self.root
    }

    fn head(&self) -> Result<CommitHash> {
        let output = self.run_git(&["rev-parse", "HEAD"])?;
        Self::ensure_success(&output, "get repository HEAD", ReportError::RepoState)?;
        CommitHash::parse(&String::from_utf8_lossy(&output.stdout))
    }

    fn current_branch(&self) -> Result<String> {
        let output = self.run_git(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        Self::ensure_success(&output, "get current branch", ReportError::RepoState)?;

        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if branch.is_empty() {
            return Err(ReportError::RepoState(
                "get current branch: HEAD is detached".to_string(),
            ));
        }
        Ok(branch)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let output = self.run_git(&["checkout", branch])?;
        Self::ensure_success(
            &output,
            &format!("checkout {branch} branch"),
            ReportError::Checkout,
        )
    }

    fn add(&self, file: &str) -> Result<()> {
        let inside = self
            .root
            .join(file)
            .canonicalize()
            .is_ok_and(|resolved| resolved.starts_with(&self.root));
        if !inside {
            return Err(ReportError::RepoState(format!(
                "Refusing to stage '{file}': not a file inside {}",
                self.root.display()
            )));
        }

        let output = self.run_git(&["add", "--", file])?;
        Self::ensure_success(&output, "add file to repo", ReportError::RepoState)
    }

    fn commit(&self, message: &str) -> Result<()> {
        let output = self.run_git(&["commit", "-m", message])?;
        Self::ensure_success(&output, "commit", ReportError::Commit)
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        let output = self.run_git(&["push", remote, branch])?;
        Self::ensure_success(&output, "push changes", ReportError::Push)
    }

    fn discard(&self, file: &str) -> Result<()> {
        let output = self.run_git(&["reset", "--quiet", "--", file])?;
        Self::ensure_success(&output, "unstage report", ReportError::RepoState)?;

        if self.is_tracked(file)? {
            let output = self.run_git(&["checkout", "--", file])?;
            return Self::ensure_success(&output, "revert report", ReportError::RepoState);
        }

        match fs::remove_file(self.root.join(file)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReportError::io("remove unpublished report", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GitFixture, git};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rejects_dangerous_paths() {
        let dir = tempdir().unwrap();
        let dangerous = dir.path().join("sub;dir");
        fs::create_dir_all(&dangerous).unwrap();
        assert!(VersionControlAgent::open(dangerous).is_err());
    }

    #[test]
    fn rejects_directory_outside_a_repository() {
        let dir = tempdir().unwrap();
        let err = VersionControlAgent::open(dir.path()).err().unwrap();
        assert!(matches!(err, ReportError::RepoState(_)));
    }

    #[test]
    fn opens_from_subdirectory_and_resolves_root() {
        let fixture = GitFixture::new();
        let sub = fixture.work().join("nested/dir");
        fs::create_dir_all(&sub).unwrap();
        let agent = VersionControlAgent::open(&sub).unwrap();
        assert_eq!(agent.root(), fixture.work().canonicalize().unwrap());
    }

    #[test]
    fn reads_head_and_current_branch() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        assert_eq!(agent.current_branch().unwrap(), "main");
        assert_eq!(agent.head().unwrap().as_str(), fixture.head());
    }

    #[test]
    fn detached_head_has_no_current_branch() {
        let fixture = GitFixture::new();
        git(fixture.work(), &["checkout", "--detach"]);
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        assert!(matches!(
            agent.current_branch(),
            Err(ReportError::RepoState(_))
        ));
    }

    #[test]
    fn checkout_of_unknown_branch_fails() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        assert!(matches!(
            agent.checkout("no-such-branch"),
            Err(ReportError::Checkout(_))
        ));
        assert_eq!(agent.current_branch().unwrap(), "main");
    }

    #[test]
    fn commits_and_pushes_publishing_branch() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();

        agent.checkout("gh-pages").unwrap();
        fs::write(fixture.work().join("dependencies.md"), "# report\n").unwrap();
        agent.add("dependencies.md").unwrap();
        agent.commit("Update dependency report").unwrap();
        agent.push("origin", "gh-pages").unwrap();

        assert_eq!(
            fixture.remote_file("gh-pages", "dependencies.md").as_deref(),
            Some("# report\n")
        );
    }

    #[test]
    fn commit_without_changes_fails_with_cause() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        let err = agent.commit("nothing to commit").unwrap_err();
        let ReportError::Commit(message) = &err else {
            panic!("unexpected error {err:?}");
        };
        // git prints the reason on stdout here
        assert!(message.starts_with("commit: "));
        assert!(message.trim_start_matches("commit: ").len() > "(exit code 1)".len());
        assert!(message.ends_with("(exit code 1)"));
    }

    #[test]
    fn silent_hook_failure_still_reports_exit_status() {
        let fixture = GitFixture::new();
        fixture.fail_commits();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        fs::write(fixture.work().join("dependencies.md"), "# report\n").unwrap();
        agent.add("dependencies.md").unwrap();

        let err = agent.commit("Update dependency report").unwrap_err().to_string();
        assert!(err.contains("exit code 1"), "{err}");
    }

    #[test]
    fn discard_reverts_tracked_report() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        fs::write(fixture.work().join("go.mod"), "module changed\n").unwrap();
        agent.add("go.mod").unwrap();

        agent.discard("go.mod").unwrap();
        assert_eq!(git(fixture.work(), &["status", "--porcelain"]), "");
        assert_eq!(
            fs::read_to_string(fixture.work().join("go.mod")).unwrap(),
            "module example.com/project\n"
        );
    }

    #[test]
    fn discard_removes_untracked_report() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        fs::write(fixture.work().join("dependencies.md"), "# report\n").unwrap();
        agent.add("dependencies.md").unwrap();

        agent.discard("dependencies.md").unwrap();
        assert_eq!(git(fixture.work(), &["status", "--porcelain"]), "");
        assert!(!fixture.work().join("dependencies.md").exists());
        // nothing left to discard is fine
        agent.discard("dependencies.md").unwrap();
    }

    #[test]
    fn rejects_system_directory() {
        assert!(matches!(
            VersionControlAgent::open("/proc"),
            Err(ReportError::RepoState(_))
        ));
    }

    #[test]
    fn refuses_to_stage_outside_repository() {
        let fixture = GitFixture::new();
        let agent = VersionControlAgent::open(fixture.work()).unwrap();
        assert!(agent.add("../outside.md").is_err());
    }
}
