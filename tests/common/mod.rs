#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use derive_new::new;
use filetime::FileTime;
use rstest::fixture;
use std::path::{Path, PathBuf};

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";

#[derive(Debug, Clone, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file: FileSpec) {
    if let Some(parent) = file.path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(&file.path, file.content).expect("Failed to write file");
}

/// Pin a file's timestamps so the status fast path sees a change
pub fn set_mtime(path: &Path, seconds: i64) {
    let time = FileTime::from_unix_time(seconds, 0);
    filetime::set_file_times(path, time, time).expect("Failed to set file times");
}

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository holding `1.txt`, `a/2.txt` and `a/b/3.txt` in one commit
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string()));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_kit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    kit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

/// Run the binary in `dir`, isolated from the user's own git configuration
pub fn run_kit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gitkit").expect("Failed to find gitkit binary");
    let no_config = dir.join(".git").join("no-user-config");
    cmd.current_dir(dir)
        .env("HOME", &no_config)
        .env("XDG_CONFIG_HOME", &no_config)
        .env("GIT_AUTHOR_NAME", AUTHOR_NAME)
        .env("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL)
        .env("NO_COLOR", "1")
        .env_remove("CLICOLOR_FORCE")
        .env_remove("GITKIT_LOG");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn kit_commit(dir: &Path, message: &str) -> Command {
    kit_commit_at(dir, message, "2023-01-01 12:00:00 +0000")
}

pub fn kit_commit_at(dir: &Path, message: &str, date: &str) -> Command {
    let mut cmd = run_kit_command(dir, &["commit", "-m", message]);
    cmd.env("GIT_AUTHOR_DATE", date);
    cmd
}

/// Run a command that must succeed and return its stdout
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout is not UTF-8")
}

pub fn head_oid(dir: &Path) -> String {
    stdout_of(run_kit_command(dir, &["rev-parse", "HEAD"]))
        .trim()
        .to_string()
}
