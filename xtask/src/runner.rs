//! External processes: the build scripts and the search-path rewrite tools.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::platform::SearchPathRewrite;

/// Interpreter the build scripts are handed to.
pub const BUILD_SHELL: &str = "bash";

/// One invocation of a build script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildTarget {
    pub script: String,
    /// Scripts run from their own directory.
    pub working_dir: PathBuf,
    pub env: Vec<(&'static str, &'static str)>,
}

/// Exit status of an external process; `code` is `None` when killed by a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStatus {
    pub code: Option<i32>,
}

impl RunStatus {
    #[cfg(test)]
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("termination by signal"),
        }
    }
}

/// Seam between the orchestrator and the outside world.
pub trait BuildRunner {
    fn execute(&self, target: &BuildTarget) -> io::Result<RunStatus>;

    fn rewrite_search_path(
        &self,
        artifact: &Path,
        rewrite: SearchPathRewrite,
    ) -> io::Result<RunStatus>;
}

/// Runs everything for real, inheriting stdio so build output streams through.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShellRunner;

impl BuildRunner for ShellRunner {
    fn execute(&self, target: &BuildTarget) -> io::Result<RunStatus> {
        debug!(
            script = %target.script,
            dir = %target.working_dir.display(),
            env = ?target.env,
            "spawning build script"
        );
        let status = Command::new(BUILD_SHELL)
            .arg(format!("./{}", target.script))
            .current_dir(&target.working_dir)
            .envs(target.env.iter().copied())
            .status()?;
        Ok(status.into())
    }

    fn rewrite_search_path(
        &self,
        artifact: &Path,
        rewrite: SearchPathRewrite,
    ) -> io::Result<RunStatus> {
        let args = rewrite.args(artifact);
        debug!(tool = rewrite.program(), ?args, "rewriting search path");
        let status = Command::new(rewrite.program()).args(&args).status()?;
        Ok(status.into())
    }
}
