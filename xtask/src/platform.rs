//! Host platforms, build variants, and the per-platform build plan.
//!
//! The external build scripts only run on macOS and Linux. A Windows DLL is
//! produced by cross-building from one of those hosts, never natively.

use std::convert::Infallible;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::StageError;

/// Shared-library stem produced by every build script.
pub const LIBRARY_STEM: &str = "libaudioflux";

/// Environment flag telling the build scripts a wheel is being produced.
pub const WHEEL_ENV: &str = "AF_BUILD_PY_BDIST";

/// Directory (relative to the project root) the build scripts write into.
pub const BUILD_OUTPUT_DIR: &str = "build";

/// Default file name of the Windows cross-build output.
///
/// The cross-build leaves a `.so`-suffixed file behind even though the
/// staged name is `.dll`. See `BuildPlan::has_extension_mismatch`.
pub const DEFAULT_WINDOWS_SOURCE_NAME: &str = "libaudioflux.so";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostPlatform {
    MacOs,
    Linux,
    Windows,
    Other(String),
}

impl HostPlatform {
    /// Platform of the running process.
    pub fn detect() -> Self {
        Self::parse(std::env::consts::OS)
    }

    /// Accepts Rust (`macos`, `windows`) and Python (`darwin`, `win32`) spellings.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Self::MacOs,
            "linux" => Self::Linux,
            "windows" | "win32" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Other(name) => name,
        }
    }

    /// Whether the shell build scripts can run here.
    pub fn is_build_host(&self) -> bool {
        matches!(self, Self::MacOs | Self::Linux)
    }

    /// File name the staged library carries for this platform, if any.
    pub fn staged_file_name(&self) -> Option<String> {
        let extension = match self {
            Self::MacOs => "dylib",
            Self::Linux => "so",
            Self::Windows => "dll",
            Self::Other(_) => return None,
        };
        Some(library_file_name(extension))
    }

    fn native_build(&self) -> Option<NativeBuild> {
        match self {
            Self::MacOs => Some(NativeBuild {
                script: "build_macOS.sh",
                out_dir: "macOSBuild",
                extension: "dylib",
            }),
            Self::Linux => Some(NativeBuild {
                script: "build_linux.sh",
                out_dir: "linuxBuild",
                extension: "so",
            }),
            Self::Windows | Self::Other(_) => None,
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HostPlatform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// All platforms that can end up with a staged library.
pub fn staged_platforms() -> [HostPlatform; 3] {
    [
        HostPlatform::Linux,
        HostPlatform::MacOs,
        HostPlatform::Windows,
    ]
}

pub fn library_file_name(extension: &str) -> String {
    format!("{LIBRARY_STEM}.{extension}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildVariant {
    /// Compile and stage.
    Build,
    /// Compile for a wheel: flag the scripts and rewrite the search path.
    Wheel,
    /// Cross-compile the Windows DLL from a macOS/Linux host.
    WindowsCross,
}

impl BuildVariant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Wheel => "build-whl",
            Self::WindowsCross => "build-win",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct NativeBuild {
    script: &'static str,
    out_dir: &'static str,
    extension: &'static str,
}

/// Patches a built library so a sibling `lib/` directory is searched at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPathRewrite {
    /// `patchelf --set-rpath '$ORIGIN/lib'`
    OriginRpath,
    /// `install_name_tool -change @rpath/libomp.dylib @loader_path/lib/libomp.dylib`
    LoaderPathOpenMp,
}

impl SearchPathRewrite {
    pub fn for_platform(platform: &HostPlatform) -> Option<Self> {
        match platform {
            HostPlatform::Linux => Some(Self::OriginRpath),
            HostPlatform::MacOs => Some(Self::LoaderPathOpenMp),
            HostPlatform::Windows | HostPlatform::Other(_) => None,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::OriginRpath => "patchelf",
            Self::LoaderPathOpenMp => "install_name_tool",
        }
    }

    pub fn args(self, artifact: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = match self {
            Self::OriginRpath => vec!["--set-rpath".into(), "$ORIGIN/lib".into()],
            Self::LoaderPathOpenMp => vec![
                "-change".into(),
                "@rpath/libomp.dylib".into(),
                "@loader_path/lib/libomp.dylib".into(),
            ],
        };
        args.push(artifact.as_os_str().to_os_string());
        args
    }
}

/// Everything needed to build and stage one library for one variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPlan {
    pub variant: BuildVariant,
    pub platform: HostPlatform,
    /// Script name inside the scripts directory.
    pub script: &'static str,
    /// Build output, relative to the project root.
    pub artifact: PathBuf,
    /// Name the library is staged under.
    pub file_name: String,
    pub env: Vec<(&'static str, &'static str)>,
    pub rewrite: Option<SearchPathRewrite>,
}

impl BuildPlan {
    pub fn resolve(
        variant: BuildVariant,
        platform: &HostPlatform,
        windows_source_name: &str,
    ) -> Result<Self, StageError> {
        let Some(native) = platform.native_build() else {
            return Err(StageError::UnsupportedPlatform {
                platform: platform.to_string(),
                variant: variant.name(),
            });
        };

        let plan = match variant {
            BuildVariant::WindowsCross => Self {
                variant,
                platform: platform.clone(),
                script: "build_windows.sh",
                artifact: Path::new(BUILD_OUTPUT_DIR)
                    .join("windowBuild")
                    .join(windows_source_name),
                file_name: library_file_name("dll"),
                env: Vec::new(),
                rewrite: None,
            },
            BuildVariant::Build | BuildVariant::Wheel => {
                let file_name = library_file_name(native.extension);
                let wheel = variant == BuildVariant::Wheel;
                Self {
                    variant,
                    platform: platform.clone(),
                    script: native.script,
                    artifact: Path::new(BUILD_OUTPUT_DIR)
                        .join(native.out_dir)
                        .join(&file_name),
                    file_name,
                    env: if wheel {
                        vec![(WHEEL_ENV, "1")]
                    } else {
                        Vec::new()
                    },
                    rewrite: if wheel {
                        SearchPathRewrite::for_platform(platform)
                    } else {
                        None
                    },
                }
            }
        };
        Ok(plan)
    }

    /// True when the build output and staged name disagree on extension.
    pub fn has_extension_mismatch(&self) -> bool {
        self.artifact.extension() != Path::new(&self.file_name).extension()
    }
}
