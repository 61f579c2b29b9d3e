use anyhow::{bail, Result};

use crate::platform::{HostPlatform, SearchPathRewrite};
use crate::runner::BUILD_SHELL;

/// Tools a `build-whl` on `platform` needs on PATH.
pub fn required_tools(platform: &HostPlatform) -> Vec<&'static str> {
    let mut tools = vec![BUILD_SHELL];
    if let Some(rewrite) = SearchPathRewrite::for_platform(platform) {
        tools.push(rewrite.program());
    }
    tools
}

pub fn run(platform: &HostPlatform) -> Result<()> {
    let mut ok = true;

    if platform.is_build_host() {
        eprintln!("[OK] host platform {platform}");
    } else {
        eprintln!(
            "[FAIL] host platform {platform} cannot run the build scripts (use macOS or Linux)"
        );
        ok = false;
    }

    for tool in required_tools(platform) {
        match which::which(tool) {
            Ok(path) => eprintln!("[OK] {tool} ({})", path.display()),
            Err(_) => {
                eprintln!("[FAIL] missing `{tool}` in PATH");
                ok = false;
            }
        }
    }

    if !ok {
        bail!("doctor checks failed");
    }
    Ok(())
}
