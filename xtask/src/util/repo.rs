use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Project root: `--root` if given, otherwise the parent of this crate.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let root = match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .map(Path::to_path_buf)
            .context("xtask is expected at <repo>/xtask")?,
    };

    if !root.is_dir() {
        bail!("Project root {} is not a directory", root.display());
    }
    root.canonicalize()
        .with_context(|| format!("Resolving project root {}", root.display()))
}
