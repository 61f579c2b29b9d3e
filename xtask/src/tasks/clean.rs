use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::XtaskConfig;
use crate::platform::{staged_platforms, HostPlatform};
use crate::stage::Project;

/// Remove staged libraries; returns what was deleted.
pub fn remove_staged(dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for file in staged_platforms()
        .iter()
        .filter_map(HostPlatform::staged_file_name)
    {
        let path = dest_dir.join(file);
        if path.is_file() {
            fs::remove_file(&path).with_context(|| format!("Removing {}", path.display()))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

pub fn run(root: &Path, config: &XtaskConfig) -> Result<()> {
    let dest = Project::new(root, config).dest_path();
    let removed = remove_staged(&dest)?;
    for path in &removed {
        tracing::info!("Removed {}", path.display());
    }
    if removed.is_empty() {
        tracing::info!("Nothing staged in {}", dest.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_only_staged_libraries() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("libaudioflux.so"), b"a").unwrap();
        fs::write(tmp.path().join("libaudioflux.dll"), b"b").unwrap();
        fs::write(tmp.path().join("__init__.py"), b"").unwrap();
        fs::create_dir(tmp.path().join("lib")).unwrap();

        let removed = remove_staged(tmp.path()).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(tmp.path().join("__init__.py").is_file());
        assert!(tmp.path().join("lib").is_dir());
        assert!(!tmp.path().join("libaudioflux.so").exists());
    }

    #[test]
    fn test_idempotent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("libaudioflux.dylib"), b"a").unwrap();
        assert_eq!(remove_staged(tmp.path()).unwrap().len(), 1);
        assert!(remove_staged(tmp.path()).unwrap().is_empty());
        assert!(remove_staged(&tmp.path().join("absent")).unwrap().is_empty());
    }
}
