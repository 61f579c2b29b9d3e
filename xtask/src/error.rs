//! Failures of the build-and-stage pipeline.
//!
//! Every variant is fatal. Nothing is retried and nothing already on disk is
//! rolled back.

use std::io;
use std::path::{Path, PathBuf};

use crate::runner::RunStatus;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Raised before any process is spawned.
    #[error(
        "platform `{platform}` is not supported for `{variant}`; build on macOS or Linux, \
         or use `pip install audioflux` to install the package"
    )]
    UnsupportedPlatform {
        platform: String,
        variant: &'static str,
    },

    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("build script `{script}` failed with {status}")]
    Build { script: String, status: RunStatus },

    /// The build reported success but left no library behind.
    #[error("build succeeded but no artifact was found at {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("`{tool}` failed to rewrite the library search path ({status})")]
    PathRewrite {
        tool: &'static str,
        status: RunStatus,
    },

    #[error("failed to {op} {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StageError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}
