// End-to-end runs of the xtask binary against throwaway project trees.
// The build scripts are small bash stand-ins that drop a fake library where
// the real ones would.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const LIB_DIR: &str = "python/audioflux/lib";

fn xtask(root: &Path, args: &[&str]) -> Output {
    xtask_with_path(root, args, None)
}

/// Runs with `extra_path` searched ahead of the inherited PATH.
fn xtask_with_path(root: &Path, args: &[&str], extra_path: Option<&Path>) -> Output {
    let path = match extra_path {
        Some(dir) => {
            let inherited = std::env::var_os("PATH").unwrap_or_default();
            let mut dirs = vec![dir.to_path_buf()];
            dirs.extend(std::env::split_paths(&inherited));
            Some(std::env::join_paths(dirs).unwrap())
        }
        None => None,
    };
    run_xtask(root, args, path.as_deref())
}

fn run_xtask(root: &Path, args: &[&str], path: Option<&OsStr>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_xtask"));
    cmd.arg("--root").arg(root).args(args).env_remove("RUST_LOG");
    if let Some(path) = path {
        cmd.env("PATH", path);
    }
    cmd.output().unwrap()
}

/// A directory holding only symlinks to the named host tools.
fn restricted_bin(root: &Path, tools: &[&str]) -> PathBuf {
    let bin = root.join("restricted-bin");
    fs::create_dir_all(&bin).unwrap();
    for tool in tools {
        symlink(which::which(tool).unwrap(), bin.join(tool)).unwrap();
    }
    bin
}

/// Writes `scripts/<name>` that records it ran, then runs `body`.
fn script(root: &Path, name: &str, body: &str) {
    let dir = root.join("scripts");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(name),
        format!("#!/bin/bash\nset -e\ntouch ../ran-{name}\n{body}\n"),
    )
    .unwrap();
}

fn linux_build_script(root: &Path, contents: &str) {
    script(
        root,
        "build_linux.sh",
        &format!(
            "mkdir -p ../build/linuxBuild\n\
             printf '%s' '{contents}' > ../build/linuxBuild/libaudioflux.so\n\
             printf '%s' \"${{AF_BUILD_PY_BDIST:-unset}}\" > ../bdist-flag"
        ),
    );
}

fn staged(root: &Path, name: &str) -> PathBuf {
    root.join(LIB_DIR).join(name)
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_linux_build_stages_library() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    linux_build_script(root, "linux-lib-v1");

    let out = xtask(root, &["--platform", "linux", "build"]);
    assert!(out.status.success(), "{}", stderr(&out));

    assert_eq!(
        fs::read_to_string(staged(root, "libaudioflux.so")).unwrap(),
        "linux-lib-v1"
    );
    assert_eq!(fs::read_dir(root.join(LIB_DIR)).unwrap().count(), 1);
    assert_eq!(fs::read_to_string(root.join("bdist-flag")).unwrap(), "unset");
    assert!(String::from_utf8_lossy(&out.stdout).contains("libaudioflux.so"));
}

#[test]
fn test_python_style_alias_still_builds() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    linux_build_script(root, "aliased");

    let out = xtask(root, &["build_py", "--platform", "linux"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(staged(root, "libaudioflux.so").is_file());
}

#[test]
fn test_failing_build_exits_nonzero_and_copies_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    script(
        root,
        "build_linux.sh",
        "mkdir -p ../build/linuxBuild\n\
         echo partial > ../build/linuxBuild/libaudioflux.so\n\
         exit 3",
    );

    let out = xtask(root, &["--platform", "linux", "build"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("exit code 3"), "{}", stderr(&out));
    assert!(root.join("ran-build_linux.sh").exists());
    assert!(!root.join(LIB_DIR).exists());
}

#[test]
fn test_unsupported_platform_never_runs_a_script() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    linux_build_script(root, "unused");
    script(root, "build_windows.sh", "exit 0");

    for (platform, cmd) in [
        ("windows", "build"),
        ("win32", "build-win"),
        ("freebsd", "build-whl"),
    ] {
        let out = xtask(root, &["--platform", platform, cmd]);
        assert!(!out.status.success());
        assert!(stderr(&out).contains("is not supported"), "{}", stderr(&out));
    }
    assert!(!root.join("ran-build_linux.sh").exists());
    assert!(!root.join("ran-build_windows.sh").exists());
}

#[test]
fn test_missing_artifact_after_successful_build_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    script(root, "build_linux.sh", "exit 0");

    let out = xtask(root, &["--platform", "linux", "build"]);
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("no artifact was found"),
        "{}",
        stderr(&out)
    );
}

#[test]
fn test_rerun_replaces_previous_library() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    linux_build_script(root, "first");
    assert!(xtask(root, &["--platform", "linux", "build"]).status.success());

    linux_build_script(root, "second");
    assert!(xtask(root, &["--platform", "linux", "build"]).status.success());

    assert_eq!(
        fs::read_to_string(staged(root, "libaudioflux.so")).unwrap(),
        "second"
    );
    assert_eq!(fs::read_dir(root.join(LIB_DIR)).unwrap().count(), 1);
}

#[test]
fn test_wheel_build_flags_script_and_patches_rpath() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    linux_build_script(root, "wheel-lib");

    let bin = root.join("fake-bin");
    fs::create_dir_all(&bin).unwrap();
    let log = root.join("patchelf-args");
    let patchelf = bin.join("patchelf");
    fs::write(
        &patchelf,
        format!("#!/bin/sh\necho \"$@\" > '{}'\n", log.display()),
    )
    .unwrap();
    fs::set_permissions(&patchelf, fs::Permissions::from_mode(0o755)).unwrap();

    let out = xtask_with_path(root, &["--platform", "linux", "build-whl"], Some(&bin));
    assert!(out.status.success(), "{}", stderr(&out));

    assert_eq!(fs::read_to_string(root.join("bdist-flag")).unwrap(), "1");
    let args = fs::read_to_string(&log).unwrap();
    assert!(args.starts_with("--set-rpath $ORIGIN/lib "), "{args}");
    assert!(
        args.trim_end().ends_with("build/linuxBuild/libaudioflux.so"),
        "{args}"
    );
    assert!(staged(root, "libaudioflux.so").is_file());
}

#[test]
fn test_plain_build_never_patches_rpath() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    linux_build_script(root, "plain");

    let bin = root.join("fake-bin");
    fs::create_dir_all(&bin).unwrap();
    let marker = root.join("patchelf-ran");
    let patchelf = bin.join("patchelf");
    fs::write(&patchelf, format!("#!/bin/sh\ntouch '{}'\n", marker.display())).unwrap();
    fs::set_permissions(&patchelf, fs::Permissions::from_mode(0o755)).unwrap();

    let out = xtask_with_path(root, &["--platform", "linux", "build"], Some(&bin));
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(!marker.exists());
}

#[test]
fn test_wheel_build_without_patchelf_stages_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    linux_build_script(root, "unpatched");
    let bin = restricted_bin(root, &["bash", "mkdir", "touch"]);

    let out = run_xtask(
        root,
        &["--platform", "linux", "build-whl"],
        Some(bin.as_os_str()),
    );
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("failed to start `patchelf`"),
        "{}",
        stderr(&out)
    );
    assert!(root.join("build/linuxBuild/libaudioflux.so").is_file());
    assert!(!staged(root, "libaudioflux.so").exists());
}

#[test]
fn test_windows_cross_build_stages_dll() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    script(
        root,
        "build_windows.sh",
        "mkdir -p ../build/windowBuild\nprintf MZ > ../build/windowBuild/libaudioflux.so",
    );

    let out = xtask(root, &["--platform", "darwin", "build-win"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("extensions differ"), "{}", stderr(&out));
    assert!(!stderr(&out).contains('\x1b'), "piped logs carry no color codes");
    assert_eq!(
        fs::read_to_string(staged(root, "libaudioflux.dll")).unwrap(),
        "MZ"
    );
}

#[test]
fn test_windows_source_name_override() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    script(
        root,
        "build_windows.sh",
        "mkdir -p ../build/windowBuild\nprintf MZ > ../build/windowBuild/libaudioflux.dll",
    );

    let out = xtask(
        root,
        &["--platform", "linux", "build-win", "--source-name", "libaudioflux.dll"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(!stderr(&out).contains("extensions differ"));
    assert!(staged(root, "libaudioflux.dll").is_file());
}

#[test]
fn test_config_file_moves_layout() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(
        root.join("xtask.toml"),
        "[layout]\nscripts_dir = \"native/scripts\"\ndest_dir = \"pkg/lib\"\n",
    )
    .unwrap();
    let scripts = root.join("native/scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(
        scripts.join("build_linux.sh"),
        "mkdir -p ../../build/linuxBuild\n\
         printf cfg > ../../build/linuxBuild/libaudioflux.so\n",
    )
    .unwrap();

    let out = xtask(root, &["--platform", "linux", "build"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(
        fs::read_to_string(root.join("pkg/lib/libaudioflux.so")).unwrap(),
        "cfg"
    );
}

#[test]
fn test_check_and_clean_round_trip() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let out = xtask(root, &["--platform", "linux", "check"]);
    assert!(!out.status.success());

    linux_build_script(root, "checked");
    assert!(xtask(root, &["--platform", "linux", "build"]).status.success());

    let out = xtask(root, &["--platform", "linux", "check", "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["entries"][0]["platform"], "linux");
    assert_eq!(report["entries"][0]["bytes"], 7);

    assert!(xtask(root, &["clean"]).status.success());
    assert!(!staged(root, "libaudioflux.so").exists());
    assert!(xtask(root, &["clean"]).status.success());
}
