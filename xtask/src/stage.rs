//! Build-and-stage orchestration.
//!
//! One linear pass: resolve the plan, run the build script, check the
//! artifact exists, optionally rewrite its search path, then copy it into the
//! package's library directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::XtaskConfig;
use crate::error::StageError;
use crate::platform::{BuildPlan, BuildVariant, HostPlatform};
use crate::runner::{BuildRunner, BuildTarget, BUILD_SHELL};

/// Where things live inside the project being packaged.
#[derive(Clone, Debug)]
pub struct Project {
    pub root: PathBuf,
    pub scripts_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub windows_source_name: String,
}

impl Project {
    pub fn new(root: &Path, config: &XtaskConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            scripts_dir: config.layout.scripts_dir.clone(),
            dest_dir: config.layout.dest_dir.clone(),
            windows_source_name: config.windows.source_name.clone(),
        }
    }

    pub fn scripts_path(&self) -> PathBuf {
        self.root.join(&self.scripts_dir)
    }

    pub fn dest_path(&self) -> PathBuf {
        self.root.join(&self.dest_dir)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedArtifact {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Build the native library for `variant` on `platform` and stage it.
pub fn run<R: BuildRunner + ?Sized>(
    variant: BuildVariant,
    platform: &HostPlatform,
    project: &Project,
    runner: &R,
) -> Result<StagedArtifact, StageError> {
    let plan = BuildPlan::resolve(variant, platform, &project.windows_source_name)?;
    debug!(?plan, "resolved build plan");

    if plan.has_extension_mismatch() {
        warn!(
            "{} is staged as {}; the extensions differ (set [windows] source_name or --source-name to change the source)",
            plan.artifact.display(),
            plan.file_name
        );
    }

    info!(
        "Compiling audioFlux native library ({}, {})",
        plan.variant, plan.platform
    );
    let target = BuildTarget {
        script: plan.script.to_string(),
        working_dir: project.scripts_path(),
        env: plan.env.clone(),
    };
    let status = runner
        .execute(&target)
        .map_err(|source| StageError::Spawn {
            program: format!("{BUILD_SHELL} {}", plan.script),
            source,
        })?;
    if !status.success() {
        return Err(StageError::Build {
            script: plan.script.to_string(),
            status,
        });
    }

    let source = project.root.join(&plan.artifact);
    if !source.is_file() {
        return Err(StageError::ArtifactMissing { path: source });
    }

    if let Some(rewrite) = plan.rewrite {
        let tool = rewrite.program();
        info!("Rewriting library search path with {tool}");
        let status = runner
            .rewrite_search_path(&source, rewrite)
            .map_err(|source| StageError::Spawn {
                program: tool.to_string(),
                source,
            })?;
        if !status.success() {
            return Err(StageError::PathRewrite { tool, status });
        }
    }
    info!("Compile audioFlux successful");

    let staged = stage_artifact(&source, &project.dest_path(), &plan.file_name)?;
    info!(
        "Copied {} to {} ({} bytes)",
        staged.source.display(),
        staged.destination.display(),
        staged.bytes
    );
    Ok(staged)
}

/// Copy `source` to `dest_dir/file_name`, replacing whatever is there.
pub fn stage_artifact(
    source: &Path,
    dest_dir: &Path,
    file_name: &str,
) -> Result<StagedArtifact, StageError> {
    if !source.is_file() {
        return Err(StageError::ArtifactMissing {
            path: source.to_path_buf(),
        });
    }

    fs::create_dir_all(dest_dir).map_err(|e| StageError::io("create", dest_dir, e))?;

    let destination = dest_dir.join(file_name);
    if destination.exists() {
        debug!(path = %destination.display(), "removing previously staged library");
        fs::remove_file(&destination).map_err(|e| StageError::io("remove", &destination, e))?;
    }

    let bytes = fs::copy(source, &destination)
        .map_err(|e| StageError::io("copy to", &destination, e))?;

    Ok(StagedArtifact {
        source: source.to_path_buf(),
        destination,
        bytes,
    })
}
