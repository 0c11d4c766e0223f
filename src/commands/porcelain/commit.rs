use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree_builder::tree_from_index;
use std::io::Write;

impl Repository {
    /// Record the index as a new commit on top of HEAD
    pub fn commit(&self, message: &str) -> anyhow::Result<ObjectId> {
        let message = message.trim();
        if message.is_empty() {
            anyhow::bail!("Aborting commit due to empty commit message");
        }

        let index = self.load_index()?;
        let tree_id = tree_from_index(self.database(), &index)?;

        let parent = self.refs().read_head()?;
        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };

        let author = Author::load()?;
        let parents = parent.into_iter().collect();
        let commit = Commit::new(tree_id, parents, author, message.to_string());
        let commit_id = self.database().store(&commit)?;
        self.refs().update_head(&commit_id)?;

        let branch = self
            .refs()
            .active_branch()?
            .unwrap_or_else(|| "detached HEAD".to_string());
        writeln!(
            self.writer(),
            "[{branch}{is_root} {}] {}",
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_id)
    }
}
