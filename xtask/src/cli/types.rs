use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::platform::HostPlatform;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build the audioFlux native library and stage it into the Python package")]
pub struct Cli {
    /// Project root (defaults to the directory above xtask/).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Host platform to build as: macos|darwin, linux, windows|win32.
    ///
    /// Defaults to the running OS. Anything else is rejected by the build commands.
    #[arg(long, global = true, value_name = "PLATFORM")]
    pub platform: Option<HostPlatform>,

    /// Debug-level logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Compile the native library with the platform build script and stage it.
    #[command(name = "build", visible_alias = "build_py")]
    Build,

    /// Like `build`, but for wheels: sets AF_BUILD_PY_BDIST=1 and points the
    /// library's search path at the sibling lib/ directory.
    #[command(name = "build-whl", visible_alias = "build_py_whl")]
    BuildWhl,

    /// Cross-compile the Windows DLL from a macOS or Linux host and stage it.
    #[command(name = "build-win", visible_alias = "build_py_win")]
    BuildWin {
        #[arg(
            long = "source-name",
            value_name = "NAME",
            help = "File name the cross-build leaves in build/windowBuild/ (default: libaudioflux.so, or [windows] source_name in xtask.toml)."
        )]
        source_name: Option<String>,
    },

    /// Report which libraries are staged; fails if the host's is missing.
    Check {
        /// Print the report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Check that bash and the search-path rewrite tool are on PATH.
    Doctor,

    /// Remove staged libraries from the package directory.
    Clean,
}
