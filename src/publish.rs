use crate::error::{Result, StarboardError};
use gix::discover;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

pub const DEFAULT_COMMIT_MESSAGE: &str = "::auto commit";

/// Work tree that receives the generated page.
pub struct Publisher {
    workdir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Pushed,
    NothingToCommit,
}

impl Publisher {
    /// Open the work tree enclosing `path`, or the current dir if `None`.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let start = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&start)?;
        let workdir = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { workdir })
    }

    /// Stages everything, commits, and pushes. A failed commit usually means
    /// there was nothing new to record; the push still runs so commits left
    /// behind by an earlier failed push go out.
    pub fn publish(&self, message: &str) -> Result<PublishOutcome> {
        self.run_git(&["add", "."])?;

        let outcome = match self.run_git(&["commit", "-m", message]) {
            Ok(_) => PublishOutcome::Pushed,
            Err(e) => {
                warn!(error = %e, "git commit failed, pushing existing commits");
                PublishOutcome::NothingToCommit
            }
        };

        self.run_git(&["push"])?;
        info!(workdir = %self.workdir.display(), ?outcome, "published");
        Ok(outcome)
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .current_dir(&self.workdir)
            .arg("--no-pager")
            .args(args)
            .output()
            .map_err(|e| {
                StarboardError::GitCommand(format!("failed to run git {}: {e}", args[0]))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(StarboardError::GitCommand(format!(
                "git {} exited with {}: {}{}",
                args[0],
                output.status,
                stderr.trim(),
                stdout.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
