use crate::common::{
    init_repository_dir, kit_commit, repository_dir, run_kit_command, set_mtime, stdout_of,
    write_file, FileSpec,
};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn clean_worktree_reports_nothing_to_commit(init_repository_dir: TempDir) {
    run_kit_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout("On branch master\nnothing to commit, working tree clean\n");
    run_kit_command(init_repository_dir.path(), &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn staged_file_edited_again_shows_both_columns(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let file = dir.join("x.txt");

    write_file(FileSpec::new(file.clone(), "one\n".to_string()));
    set_mtime(&file, 1_000_000);
    run_kit_command(dir, &["add", "x.txt"]).assert().success();
    write_file(FileSpec::new(file.clone(), "two\n".to_string()));
    set_mtime(&file, 2_000_000);

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("AM x.txt\n");
}

#[rstest]
fn worktree_edit_after_second_commit_is_only_unstaged(repository_dir: TempDir) {
    let dir = repository_dir.path();
    let file = dir.join("x");
    run_kit_command(dir, &["init"]).assert().success();

    write_file(FileSpec::new(file.clone(), "1".to_string()));
    set_mtime(&file, 1_000_000);
    run_kit_command(dir, &["add", "x"]).assert().success();
    kit_commit(dir, "first").assert().success();

    write_file(FileSpec::new(file.clone(), "2".to_string()));
    set_mtime(&file, 2_000_000);
    run_kit_command(dir, &["add", "x"]).assert().success();
    kit_commit(dir, "second").assert().success();

    write_file(FileSpec::new(file.clone(), "3".to_string()));
    set_mtime(&file, 3_000_000);

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout(" M x\n");

    let status = stdout_of(run_kit_command(dir, &["status"]));
    let expected = [
        "On branch master",
        "",
        "Changes not staged for commit:",
        "        modified:   x",
    ];
    assert_eq!(status.lines().collect::<Vec<_>>(), expected);
}

#[rstest]
fn long_format_groups_changes(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    write_file(FileSpec::new(dir.join("new.txt"), "new".to_string()));
    run_kit_command(dir, &["add", "new.txt"]).assert().success();
    write_file(FileSpec::new(dir.join("a/2.txt"), "changed".to_string()));
    set_mtime(&dir.join("a/2.txt"), 2_000_000);
    std::fs::remove_file(dir.join("a/b/3.txt")).unwrap();
    write_file(FileSpec::new(dir.join("scratch.txt"), "scratch".to_string()));

    let status = stdout_of(run_kit_command(dir, &["status"]));

    let expected = [
        "On branch master",
        "",
        "Changes to be committed:",
        "        new file:   new.txt",
        "",
        "Changes not staged for commit:",
        "        modified:   a/2.txt",
        "        deleted:    a/b/3.txt",
        "",
        "Untracked files:",
        "        scratch.txt",
    ];
    assert_eq!(status.lines().collect::<Vec<_>>(), expected);
}

#[rstest]
fn touched_but_unchanged_files_are_clean(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    set_mtime(&dir.join("1.txt"), 3_000_000);

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn staged_gitignore_hides_untracked_files(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_kit_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(
        dir.join(".gitignore"),
        "*.log\n!keep.log\nbuild/\n".to_string(),
    ));
    write_file(FileSpec::new(dir.join("keep.log"), "k".to_string()));
    write_file(FileSpec::new(dir.join("other.log"), "o".to_string()));
    write_file(FileSpec::new(dir.join("build/out.o"), "b".to_string()));

    // not staged yet: the rules do not apply
    let before = stdout_of(run_kit_command(dir, &["status", "--porcelain"]));
    assert!(before.contains("?? other.log\n"));

    run_kit_command(dir, &["add", ".gitignore"]).assert().success();

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("A  .gitignore\n?? keep.log\n");
}

#[rstest]
fn nested_gitignore_applies_below_its_directory(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("a/.gitignore"), "*.tmp\n".to_string()));
    write_file(FileSpec::new(dir.join("a/x.tmp"), "x".to_string()));
    write_file(FileSpec::new(dir.join("y.tmp"), "y".to_string()));
    run_kit_command(dir, &["add", "a/.gitignore"]).assert().success();
    kit_commit(dir, "Ignore temp files").assert().success();

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("?? y.tmp\n");
}

#[rstest]
fn global_ignore_file_is_honoured(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(
        dir.join(".git/no-user-config/git/ignore"),
        "*.swp\n".to_string(),
    ));
    write_file(FileSpec::new(dir.join("1.txt.swp"), "swap".to_string()));

    run_kit_command(dir, &["status", "--porcelain"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn detached_head_is_reported(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = stdout_of(run_kit_command(dir, &["rev-parse", "HEAD"]));
    std::fs::write(dir.join(".git/HEAD"), &head).unwrap();

    run_kit_command(dir, &["status"])
        .assert()
        .success()
        .stdout(format!(
            "HEAD detached at {}\nnothing to commit, working tree clean\n",
            &head[..7]
        ));
}
