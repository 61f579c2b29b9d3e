use anyhow::{Context, Result};
use std::path::Path;

use crate::config::XtaskConfig;
use crate::platform::{BuildVariant, HostPlatform};
use crate::runner::ShellRunner;
use crate::stage::{self, Project};

pub fn run(
    variant: BuildVariant,
    platform: &HostPlatform,
    root: &Path,
    config: &XtaskConfig,
) -> Result<()> {
    let project = Project::new(root, config);
    tracing::info!("Project: {}", project.root.display());

    let staged = stage::run(variant, platform, &project, &ShellRunner)
        .with_context(|| format!("`{variant}` failed on {platform}"))?;

    println!("{}", staged.destination.display());
    Ok(())
}
