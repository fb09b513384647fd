use crate::agents::report_writer::ReportWriter;
use crate::agents::version_control::ReportRepository;
use crate::config::{COMMIT_MESSAGE, REPORT_FILE};
use crate::error::{ReportError, Result};

/// Progress of a single publication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    NotStarted,
    Skipped,
    BranchCaptured,
    CheckedOutTarget,
    FileWritten,
    Staged,
    Committed,
    Pushed,
    BranchRestored,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No credential was available.
    Skipped,
    Published { branch: String, restored: String },
}

/// Holds the publishing branch checked out; checks the original branch
/// back out when restored or dropped.
pub struct BranchGuard<'a, R: ReportRepository + ?Sized> {
    repo: &'a R,
    original: String,
    released: bool,
}

impl<'a, R: ReportRepository + ?Sized> BranchGuard<'a, R> {
    /// Checks out `target`. The guard only exists once the checkout succeeded.
    pub fn checkout(repo: &'a R, target: &str, original: String) -> Result<Self> {
        repo.checkout(target)?;
        Ok(Self {
            repo,
            original,
            released: false,
        })
    }

    /// Returns to the original branch, reporting its name.
    pub fn restore(mut self) -> Result<String> {
        self.released = true;
        self.repo.checkout(&self.original).map_err(|e| {
            ReportError::Restore(format!("checkout {}: {e}", self.original))
        })?;
        Ok(self.original.clone())
    }
}

impl<R: ReportRepository + ?Sized> Drop for BranchGuard<'_, R> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.repo.checkout(&self.original) {
            tracing::error!("Unable to restore branch {}: {}", self.original, e);
        }
    }
}

/// ReportPublisher commits the rendered report to the publishing branch
pub struct ReportPublisher<'a, R: ReportRepository + ?Sized> {
    repo: &'a R,
    branch: &'a str,
    remote: &'a str,
    history: Vec<PublishState>,
}

impl<'a, R: ReportRepository + ?Sized> ReportPublisher<'a, R> {
    pub fn new(repo: &'a R, branch: &'a str, remote: &'a str) -> Self {
        Self {
            repo,
            branch,
            remote,
            history: vec![PublishState::NotStarted],
        }
    }

    pub fn state(&self) -> PublishState {
        self.history
            .last()
            .copied()
            .unwrap_or(PublishState::NotStarted)
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[PublishState] {
        &self.history
    }

    fn enter(&mut self, state: PublishState) {
        tracing::debug!("Publisher state: {:?} -> {:?}", self.state(), state);
        self.history.push(state);
    }

    fn fail<T>(&mut self, err: ReportError) -> Result<T> {
        self.enter(PublishState::Failed);
        Err(err)
    }

    pub fn publish(&mut self, credential: Option<&str>, content: &str) -> Result<PublishOutcome> {
        if credential.is_none_or(str::is_empty) {
            self.enter(PublishState::Skipped);
            return Ok(PublishOutcome::Skipped);
        }

        let original = match self.repo.current_branch() {
            Ok(branch) => branch,
            Err(e) => return self.fail(e),
        };
        self.enter(PublishState::BranchCaptured);

        tracing::info!("Checking out branch {}", self.branch);
        let guard = match BranchGuard::checkout(self.repo, self.branch, original) {
            Ok(guard) => guard,
            Err(e) => return self.fail(e),
        };
        self.enter(PublishState::CheckedOutTarget);

        let published = self.publish_on_branch(content);
        if published.is_err() {
            self.enter(PublishState::Failed);
            // A modified or staged report would block the checkout back
            // or follow it onto the original branch.
            if let Err(e) = self.repo.discard(REPORT_FILE) {
                tracing::error!("Unable to discard unpublished report: {e}");
            }
        }

        tracing::info!("Restoring original branch");
        match (published, guard.restore()) {
            (Ok(()), Ok(restored)) => {
                self.enter(PublishState::BranchRestored);
                Ok(PublishOutcome::Published {
                    branch: self.branch.to_string(),
                    restored,
                })
            }
            (Ok(()), Err(restore_err)) => self.fail(restore_err),
            (Err(e), Ok(_)) => {
                self.enter(PublishState::BranchRestored);
                Err(e)
            }
            (Err(e), Err(restore_err)) => {
                tracing::error!("{restore_err}");
                Err(e)
            }
        }
    }

    fn publish_on_branch(&mut self, content: &str) -> Result<()> {
        let target = self.repo.root().join(REPORT_FILE);
        ReportWriter::write_file(&target, content)?;
        self.enter(PublishState::FileWritten);

        self.repo.add(REPORT_FILE)?;
        self.enter(PublishState::Staged);

        self.repo.commit(COMMIT_MESSAGE)?;
        self.enter(PublishState::Committed);

        tracing::info!("Pushing {} to {}", self.branch, self.remote);
        self.repo.push(self.remote, self.branch)?;
        self.enter(PublishState::Pushed);

        Ok(())
    }
}
