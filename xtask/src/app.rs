use anyhow::Result;

use crate::cli::{Cli, Cmd};
use crate::platform::{BuildVariant, HostPlatform};

pub fn run(cli: Cli) -> Result<()> {
    let root = crate::util::repo::project_root(cli.root.as_deref())?;
    let mut config = crate::config::XtaskConfig::load(&root)?;
    let platform = cli.platform.unwrap_or_else(HostPlatform::detect);

    match cli.cmd {
        Cmd::Build => crate::tasks::build::run(BuildVariant::Build, &platform, &root, &config),
        Cmd::BuildWhl => crate::tasks::build::run(BuildVariant::Wheel, &platform, &root, &config),
        Cmd::BuildWin { source_name } => {
            if let Some(name) = source_name {
                config.windows.source_name = name;
            }
            crate::tasks::build::run(BuildVariant::WindowsCross, &platform, &root, &config)
        }
        Cmd::Check { json } => crate::tasks::check::run(&platform, &root, &config, json),
        Cmd::Doctor => crate::tasks::doctor::run(&platform),
        Cmd::Clean => crate::tasks::clean::run(&root, &config),
    }
}
