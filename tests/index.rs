use crate::common::{
    init_repository_dir, repository_dir, run_kit_command, stdout_of, write_file, FileSpec,
};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

const DIRC_SIGNATURE: &[u8] = b"DIRC";

#[rstest]
fn add_writes_a_version_two_index(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    write_file(FileSpec::new(
        repository_dir.path().join("hello.txt"),
        "hello\n".to_string(),
    ));

    run_kit_command(repository_dir.path(), &["add", "hello.txt"])
        .assert()
        .success();

    let index = std::fs::read(repository_dir.path().join(".git/index")).unwrap();
    assert_eq!(&index[..4], DIRC_SIGNATURE);
    assert_eq!(u32::from_be_bytes(index[4..8].try_into().unwrap()), 2);
    assert_eq!(u32::from_be_bytes(index[8..12].try_into().unwrap()), 1);

    run_kit_command(repository_dir.path(), &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("A  hello.txt\n");
}

#[rstest]
fn add_expands_directories(repository_dir: TempDir) {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    for name in ["src/main.rs", "src/lib/mod.rs", "README"] {
        write_file(FileSpec::new(
            repository_dir.path().join(name),
            format!("{name}\n"),
        ));
    }

    run_kit_command(repository_dir.path(), &["add", "src"])
        .assert()
        .success();

    run_kit_command(repository_dir.path(), &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("A  src/lib/mod.rs\nA  src/main.rs\n?? README\n");
}

#[rstest]
fn add_from_a_subdirectory_uses_worktree_relative_names(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("a/b/new.txt"), "new".to_string()));

    run_kit_command(&dir.join("a/b"), &["add", "new.txt"])
        .assert()
        .success();

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("A  a/b/new.txt\n");
}

#[rstest]
fn add_refuses_missing_files(init_repository_dir: TempDir) {
    run_kit_command(init_repository_dir.path(), &["add", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}

#[rstest]
fn add_refuses_paths_outside_the_worktree(init_repository_dir: TempDir) {
    let outside = TempDir::new().unwrap();
    write_file(FileSpec::new(outside.path().join("far.txt"), "far".to_string()));
    let path = outside.path().join("far.txt");

    run_kit_command(init_repository_dir.path(), &["add", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside repository worktree"));
}

#[rstest]
fn rm_deletes_from_index_and_worktree(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_kit_command(dir, &["rm", "a/2.txt"])
        .assert()
        .success()
        .stdout("rm 'a/2.txt'\n");

    assert!(!dir.join("a/2.txt").exists());
    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("D  a/2.txt\n");
}

#[rstest]
fn rm_cached_keeps_the_worktree_file(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_kit_command(dir, &["rm", "--cached", "1.txt"])
        .assert()
        .success();

    assert!(dir.join("1.txt").is_file());
    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("D  1.txt\n?? 1.txt\n");
}

#[rstest]
fn rm_of_an_untracked_path_changes_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("loose.txt"), "loose".to_string()));
    let index_before = std::fs::read(dir.join(".git/index")).unwrap();

    run_kit_command(dir, &["rm", "1.txt", "loose.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "pathspec 'loose.txt' did not match any file known to the index",
        ));

    assert!(dir.join("1.txt").is_file());
    assert_eq!(std::fs::read(dir.join(".git/index")).unwrap(), index_before);
    assert_eq!(stdout_of(run_kit_command(dir, &["status", "--porcelain"])), "?? loose.txt\n");
}
