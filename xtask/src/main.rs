//! # audioFlux xtask
//!
//! Builds the native `libaudioflux` shared library with the platform shell
//! scripts under `scripts/` and stages it into `python/audioflux/lib`.
//!
//! ```bash
//! cargo xtask build        # compile + stage for this host
//! cargo xtask build-whl    # same, for a wheel (search path rewritten)
//! cargo xtask build-win    # cross-build libaudioflux.dll from macOS/Linux
//! cargo xtask check        # which libraries are staged
//! ```

use anyhow::Result;
use clap::Parser;

mod app;
mod cli;
mod config;
mod error;
mod platform;
mod runner;
mod stage;
mod tasks;
mod util;

fn main() -> Result<()> {
    let cli = crate::cli::Cli::parse();
    crate::util::logger::init(cli.verbose);
    crate::app::run(cli)
}
