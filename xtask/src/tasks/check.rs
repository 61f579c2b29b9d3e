use anyhow::{bail, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::XtaskConfig;
use crate::platform::{staged_platforms, HostPlatform};
use crate::stage::Project;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub dest_dir: PathBuf,
    pub host: String,
    pub entries: Vec<CheckEntry>,
}

#[derive(Debug, Serialize)]
pub struct CheckEntry {
    pub platform: String,
    pub file: String,
    pub present: bool,
    pub bytes: Option<u64>,
}

impl CheckReport {
    fn entry_for(&self, platform: &HostPlatform) -> Option<&CheckEntry> {
        self.entries.iter().find(|e| e.platform == platform.id())
    }
}

pub fn inspect(dest_dir: &Path, host: &HostPlatform) -> CheckReport {
    let entries = staged_platforms()
        .iter()
        .filter_map(|p| {
            let file = p.staged_file_name()?;
            let bytes = fs::metadata(dest_dir.join(&file))
                .ok()
                .filter(fs::Metadata::is_file)
                .map(|m| m.len());
            Some(CheckEntry {
                platform: p.id().to_string(),
                file,
                present: bytes.is_some(),
                bytes,
            })
        })
        .collect();

    CheckReport {
        dest_dir: dest_dir.to_path_buf(),
        host: host.id().to_string(),
        entries,
    }
}

pub fn run(platform: &HostPlatform, root: &Path, config: &XtaskConfig, json: bool) -> Result<()> {
    let project = Project::new(root, config);
    let report = inspect(&project.dest_path(), platform);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("[info] Staged in: {}", report.dest_dir.display());
        for e in &report.entries {
            match e.bytes {
                Some(bytes) => eprintln!("[ok] {}: {} ({bytes} bytes)", e.platform, e.file),
                None => eprintln!("[missing] {}: {}", e.platform, e.file),
            }
        }
    }

    if let Some(entry) = report.entry_for(platform) {
        if !entry.present {
            bail!(
                "{} is not staged in {} (run `cargo xtask build`)",
                entry.file,
                report.dest_dir.display()
            );
        }
    }
    Ok(())
}
