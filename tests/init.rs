use crate::common::{repository_dir, run_kit_command, write_file, FileSpec};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn init_lays_out_the_metadata_directory(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized empty Git repository in"));

    let git_dir = repository_dir.path().join(".git");
    for dir in ["objects", "refs/heads", "refs/tags"] {
        assert!(git_dir.join(dir).is_dir(), "{dir} is missing");
    }
    assert_eq!(
        std::fs::read_to_string(git_dir.join("HEAD"))?,
        "ref: refs/heads/master\n"
    );
    let config = std::fs::read_to_string(git_dir.join("config"))?;
    assert!(config.contains("repositoryformatversion = 0"));
    assert!(git_dir.join("description").is_file());

    Ok(())
}

#[rstest]
fn init_creates_a_missing_target_directory(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init", "nested/repo"])
        .assert()
        .success();

    assert!(repository_dir.path().join("nested/repo/.git/HEAD").is_file());
}

#[rstest]
fn init_refuses_a_non_empty_directory(repository_dir: TempDir) {
    write_file(FileSpec::new(
        repository_dir.path().join("existing.txt"),
        "x".to_string(),
    ));

    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}

#[rstest]
fn commands_work_from_nested_directories(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    let nested = repository_dir.path().join("deep/inside");
    std::fs::create_dir_all(&nested).unwrap();

    run_kit_command(&nested, &["status"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("On branch master"));
}

#[rstest]
fn newer_repository_formats_are_refused(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    std::fs::write(
        repository_dir.path().join(".git/config"),
        "[core]\n\trepositoryformatversion = 1\n",
    )
    .unwrap();

    run_kit_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported repositoryformatversion 1"));
}
