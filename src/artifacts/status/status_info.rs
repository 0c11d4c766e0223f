use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::artifacts::status::ignore::IgnoreRules;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

/// Flat `path -> blob id` view of a tree
pub type HeadTree = BTreeMap<String, ObjectId>;
pub type IndexChangeSet = BTreeMap<String, IndexChangeType>;
pub type WorkspaceChangeSet = BTreeMap<String, WorkspaceChangeType>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD names a branch, which may not have any commit yet
    Branch(String),
    /// HEAD holds a commit id directly
    Detached(Option<ObjectId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub head: HeadState,
    /// changes to be committed
    pub staged: IndexChangeSet,
    /// changes not staged for commit
    pub unstaged: WorkspaceChangeSet,
    pub untracked: BTreeSet<String>,
}

impl StatusInfo {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self) -> anyhow::Result<StatusInfo> {
        let index = self.repository.load_index()?;
        self.compute(&index)
    }

    pub fn compute(&self, index: &Index) -> anyhow::Result<StatusInfo> {
        let head = self.head_state()?;
        let staged = self.staged_changes(index)?;
        let (unstaged, untracked) = self.workspace_changes(index)?;

        Ok(StatusInfo {
            head,
            staged,
            unstaged,
            untracked,
        })
    }

    fn head_state(&self) -> anyhow::Result<HeadState> {
        let refs = self.repository.refs();
        Ok(match refs.active_branch()? {
            Some(branch) => HeadState::Branch(branch),
            None => HeadState::Detached(refs.read_head()?),
        })
    }

    /// Index against the tree of the HEAD commit
    fn staged_changes(&self, index: &Index) -> anyhow::Result<IndexChangeSet> {
        let mut head_tree = self.load_head_tree()?;
        let mut changes = IndexChangeSet::new();

        for entry in index.entries() {
            match head_tree.remove(&entry.name) {
                None => {
                    changes.insert(entry.name.clone(), IndexChangeType::Added);
                }
                Some(oid) if oid != entry.oid => {
                    changes.insert(entry.name.clone(), IndexChangeType::Modified);
                }
                Some(_) => {}
            }
        }

        for name in head_tree.into_keys() {
            changes.insert(name, IndexChangeType::Deleted);
        }

        Ok(changes)
    }

    /// Working tree against the index, plus whatever the index does not know
    fn workspace_changes(
        &self,
        index: &Index,
    ) -> anyhow::Result<(WorkspaceChangeSet, BTreeSet<String>)> {
        let workspace = self.repository.workspace();
        let mut candidates = workspace.list_files()?.into_iter().collect::<BTreeSet<_>>();
        let mut changes = WorkspaceChangeSet::new();

        for entry in index.entries() {
            if !candidates.remove(&entry.name) {
                changes.insert(entry.name.clone(), WorkspaceChangeType::Deleted);
                continue;
            }

            let Some(stat) = workspace.stat_file(&entry.name)? else {
                changes.insert(entry.name.clone(), WorkspaceChangeType::Deleted);
                continue;
            };
            if entry.times_match(&stat) {
                continue;
            }

            let oid = workspace.parse_blob(&entry.name)?.object_id()?;
            if oid != entry.oid {
                changes.insert(entry.name.clone(), WorkspaceChangeType::Modified);
            }
        }

        let ignore = IgnoreRules::load(self.repository, index)?;
        candidates.retain(|path| !ignore.is_ignored(path));

        Ok((changes, candidates))
    }

    fn load_head_tree(&self) -> anyhow::Result<HeadTree> {
        let mut head_tree = HeadTree::new();

        if let Some(head_oid) = self.repository.refs().read_head()? {
            let commit = self.repository.database().load_commit(&head_oid)?;
            self.flatten_tree(commit.tree_oid(), "", &mut head_tree)?;
        }

        Ok(head_tree)
    }

    fn flatten_tree(
        &self,
        oid: &ObjectId,
        prefix: &str,
        head_tree: &mut HeadTree,
    ) -> anyhow::Result<()> {
        let tree = self.repository.database().load_tree(oid)?;

        for entry in tree.into_entries() {
            let path = if prefix.is_empty() {
                entry.name
            } else {
                format!("{prefix}/{}", entry.name)
            };

            match entry.mode {
                EntryMode::Directory => self.flatten_tree(&entry.oid, &path, head_tree)?,
                EntryMode::Gitlink => {
                    tracing::debug!(%path, oid = %entry.oid, "skipping submodule link");
                }
                _ => {
                    head_tree.insert(path, entry.oid);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::index_entry::IndexEntry;
    use crate::artifacts::objects::commit::{Author, Commit};
    use crate::artifacts::objects::tree_builder::tree_from_index;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use filetime::FileTime;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Fixture {
        dir: TempDir,
        repo: Repository,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let repo = Repository::create(dir.path(), Box::new(std::io::sink())).unwrap();
        Fixture { dir, repo }
    }

    fn stage(repo: &Repository, index: &mut Index, name: &str) {
        let blob = repo.workspace().parse_blob(name).unwrap();
        let oid = repo.database().store(&blob).unwrap();
        let stat = repo.workspace().stat_file(name).unwrap().unwrap();
        index.add(IndexEntry::new(name.to_string(), oid, stat));
    }

    fn commit(repo: &Repository, index: &Index) {
        let tree = tree_from_index(repo.database(), index).unwrap();
        let parents = repo.refs().read_head().unwrap().into_iter().collect();
        let author = Author::try_from("T <t@example.com> 1000000000 +0000").unwrap();
        let oid = repo
            .database()
            .store(&Commit::new(tree, parents, author, "commit".to_string()))
            .unwrap();
        repo.refs().update_head(&oid).unwrap();
    }

    fn touch(dir: &TempDir, name: &str, seconds: i64) {
        let time = FileTime::from_unix_time(seconds, 0);
        filetime::set_file_times(dir.path().join(name), time, time).unwrap();
    }

    #[rstest]
    fn fresh_repository_is_clean(fixture: Fixture) {
        let info = Status::new(&fixture.repo).initialize().unwrap();

        assert_eq!(info.head, HeadState::Branch("master".to_string()));
        assert!(info.is_clean());
    }

    #[rstest]
    fn staged_then_edited_file_shows_on_both_sides(fixture: Fixture) {
        let repo = &fixture.repo;
        let mut index = repo.load_index().unwrap();

        fixture.dir.child("base.txt").write_str("base\n").unwrap();
        stage(repo, &mut index, "base.txt");
        commit(repo, &index);

        fixture.dir.child("x.txt").write_str("one\n").unwrap();
        touch(&fixture.dir, "x.txt", 1_000_000);
        stage(repo, &mut index, "x.txt");

        fixture.dir.child("x.txt").write_str("two\n").unwrap();
        touch(&fixture.dir, "x.txt", 2_000_000);

        let info = Status::new(repo).compute(&index).unwrap();

        assert_eq!(
            info.staged,
            IndexChangeSet::from([("x.txt".to_string(), IndexChangeType::Added)])
        );
        assert_eq!(
            info.unstaged,
            WorkspaceChangeSet::from([("x.txt".to_string(), WorkspaceChangeType::Modified)])
        );
        assert!(info.untracked.is_empty());
    }

    #[rstest]
    fn touched_but_identical_file_is_unchanged(fixture: Fixture) {
        let repo = &fixture.repo;
        let mut index = repo.load_index().unwrap();

        fixture.dir.child("a.txt").write_str("same\n").unwrap();
        touch(&fixture.dir, "a.txt", 1_000_000);
        stage(repo, &mut index, "a.txt");
        touch(&fixture.dir, "a.txt", 3_000_000);

        let info = Status::new(repo).compute(&index).unwrap();
        assert!(info.unstaged.is_empty());
    }

    #[rstest]
    fn deletions_are_reported_against_head_and_index(fixture: Fixture) {
        let repo = &fixture.repo;
        let mut index = repo.load_index().unwrap();

        fixture.dir.child("gone.txt").write_str("g\n").unwrap();
        fixture.dir.child("dir/staged-rm.txt").write_str("s\n").unwrap();
        stage(repo, &mut index, "gone.txt");
        stage(repo, &mut index, "dir/staged-rm.txt");
        commit(repo, &index);

        std::fs::remove_file(fixture.dir.path().join("gone.txt")).unwrap();
        index.remove("dir/staged-rm.txt");

        let info = Status::new(repo).compute(&index).unwrap();

        assert_eq!(
            info.staged,
            IndexChangeSet::from([("dir/staged-rm.txt".to_string(), IndexChangeType::Deleted)])
        );
        assert_eq!(
            info.unstaged,
            WorkspaceChangeSet::from([("gone.txt".to_string(), WorkspaceChangeType::Deleted)])
        );
        assert_eq!(
            info.untracked,
            BTreeSet::from(["dir/staged-rm.txt".to_string()])
        );
    }

    #[rstest]
    fn staged_gitignore_filters_untracked_files(fixture: Fixture) {
        let repo = &fixture.repo;
        let mut index = repo.load_index().unwrap();

        fixture.dir.child(".gitignore").write_str("*.log\n!keep.log\n").unwrap();
        fixture.dir.child("keep.log").write_str("k\n").unwrap();
        fixture.dir.child("other.log").write_str("o\n").unwrap();
        stage(repo, &mut index, ".gitignore");

        let info = Status::new(repo).compute(&index).unwrap();

        assert_eq!(info.untracked, BTreeSet::from(["keep.log".to_string()]));
    }

    #[rstest]
    fn unstaged_gitignore_has_no_effect(fixture: Fixture) {
        fixture.dir.child(".gitignore").write_str("*.log\n").unwrap();
        fixture.dir.child("other.log").write_str("o\n").unwrap();

        let info = Status::new(&fixture.repo).initialize().unwrap();

        assert_eq!(
            info.untracked,
            BTreeSet::from([".gitignore".to_string(), "other.log".to_string()])
        );
    }

    #[rstest]
    fn exclude_file_applies_to_the_whole_worktree(fixture: Fixture) {
        fixture.dir.child(".git/info/exclude").write_str("secret/\n").unwrap();
        fixture.dir.child("secret/key.pem").write_str("k\n").unwrap();
        fixture.dir.child("public.txt").write_str("p\n").unwrap();

        let info = Status::new(&fixture.repo).initialize().unwrap();

        assert_eq!(info.untracked, BTreeSet::from(["public.txt".to_string()]));
    }

    #[rstest]
    fn detached_head_is_reported(fixture: Fixture) {
        let repo = &fixture.repo;
        let index = repo.load_index().unwrap();
        commit(repo, &index);
        let oid = repo.refs().read_head().unwrap().unwrap();
        std::fs::write(repo.refs().head_path(), format!("{oid}\n")).unwrap();

        let info = Status::new(repo).compute(&index).unwrap();
        assert_eq!(info.head, HeadState::Detached(Some(oid)));
    }
}
