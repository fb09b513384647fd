//! Throwaway git repositories for tests.

use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A working repository on `main` with a `gh-pages` branch, pushed to a bare `origin`.
pub struct GitFixture {
    work: TempDir,
    remote: TempDir,
}

impl GitFixture {
    pub fn new() -> Self {
        let remote = tempfile::tempdir().unwrap();
        git(remote.path(), &["init", "--bare", "--quiet"]);

        let work = tempfile::tempdir().unwrap();
        let dir = work.path();
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(dir, &["config", "user.name", "Report Bot"]);
        git(dir, &["config", "user.email", "report-bot@example.com"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
        fs::write(dir.join("go.mod"), "module example.com/project\n").unwrap();
        git(dir, &["add", "go.mod"]);
        git(dir, &["commit", "--quiet", "-m", "initial"]);
        git(dir, &["branch", "gh-pages"]);
        git(
            dir,
            &["remote", "add", "origin", &remote.path().to_string_lossy()],
        );
        git(dir, &["push", "--quiet", "origin", "gh-pages"]);

        Self { work, remote }
    }

    /// Installs a silent `pre-commit` hook that rejects every commit.
    pub fn fail_commits(&self) {
        let hooks = self.work().join(".git").join("hooks");
        fs::create_dir_all(&hooks).unwrap();
        let hook = hooks.join("pre-commit");
        fs::write(&hook, "#!/bin/sh\nexit 1\n").unwrap();
        #[cfg(unix)]
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
        git(
            self.work(),
            &["config", "core.hooksPath", &hooks.to_string_lossy()],
        );
    }

    pub fn work(&self) -> &Path {
        self.work.path()
    }

    pub fn head(&self) -> String {
        git(self.work(), &["rev-parse", "HEAD"])
    }

    pub fn current_branch(&self) -> String {
        git(self.work(), &["symbolic-ref", "--short", "HEAD"])
    }

    pub fn commit_count(&self, branch: &str) -> usize {
        git(self.work(), &["rev-list", "--count", branch])
            .parse()
            .unwrap()
    }

    /// Contents of `file` on `branch` in the bare remote, if present.
    pub fn remote_file(&self, branch: &str, file: &str) -> Option<String> {
        let output = Command::new("git")
            .current_dir(self.remote.path())
            .args(["show", &format!("{branch}:{file}")])
            .output()
            .unwrap();
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
