use crate::common::{head_oid, init_repository_dir, run_kit_command, stdout_of};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn lightweight_tag_points_at_the_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);

    run_kit_command(dir, &["tag", "v1.0"]).assert().success();

    assert_eq!(
        std::fs::read_to_string(dir.join(".git/refs/tags/v1.0")).unwrap(),
        format!("{head}\n")
    );
    assert_eq!(stdout_of(run_kit_command(dir, &["tag"])), "v1.0\n");
}

#[rstest]
fn annotated_tag_stores_a_tag_object(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);

    run_kit_command(dir, &["tag", "-m", "First release", "release"])
        .assert()
        .success();

    let tag_oid = stdout_of(run_kit_command(dir, &["rev-parse", "release"]));
    assert_ne!(tag_oid.trim(), head);

    let tag = stdout_of(run_kit_command(dir, &["cat-file", "-p", "release"]));
    let header = format!(
        "object {head}\ntype commit\ntag release\ntagger fake_user <fake_email@email.com> "
    );
    assert!(tag.starts_with(&header));
    assert!(tag.ends_with("\n\nFirst release\n"));

    // peeling through the tag
    assert_eq!(
        stdout_of(run_kit_command(dir, &["rev-parse", "--type", "commit", "release"])).trim(),
        head
    );
    run_kit_command(dir, &["ls-tree", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\t1.txt\n"));
}

#[rstest]
fn tags_can_point_at_any_object(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let tree = stdout_of(run_kit_command(dir, &["rev-parse", "--type", "tree", "HEAD"]));

    run_kit_command(dir, &["tag", "-a", "snapshot", tree.trim()])
        .assert()
        .success();

    let tag = stdout_of(run_kit_command(dir, &["cat-file", "tag", "snapshot"]));
    assert!(tag.starts_with(&format!("object {}\ntype tree\n", tree.trim())));
}

#[rstest]
fn duplicate_and_invalid_tag_names_are_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_kit_command(dir, &["tag", "v1"]).assert().success();

    run_kit_command(dir, &["tag", "v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tag 'v1' already exists"));
    run_kit_command(dir, &["tag", "bad..name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid branch or tag name"));
}

#[rstest]
fn branches_are_created_and_listed(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);

    run_kit_command(dir, &["branch", "feature"]).assert().success();
    run_kit_command(dir, &["branch", "topic/nested", "master"])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(dir.join(".git/refs/heads/feature")).unwrap(),
        format!("{head}\n")
    );
    assert_eq!(
        stdout_of(run_kit_command(dir, &["branch"])),
        "  feature\n* master\n  topic/nested\n"
    );
}

#[rstest]
fn branch_names_are_validated(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    for name in ["has space", "ends.lock", "a..b", "trailing/"] {
        run_kit_command(dir, &["branch", name])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a valid branch or tag name"));
    }

    run_kit_command(dir, &["branch", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
fn branch_names_resolve_like_heads(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_oid(dir);
    run_kit_command(dir, &["branch", "feature"]).assert().success();

    assert_eq!(
        stdout_of(run_kit_command(dir, &["rev-parse", "feature"])).trim(),
        head
    );
    assert_eq!(
        stdout_of(run_kit_command(dir, &["rev-parse", "heads/feature"])).trim(),
        head
    );
}
