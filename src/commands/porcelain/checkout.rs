use crate::areas::repository::Repository;
use crate::artifacts::checkout::{TreeWriter, prepare_target};
use crate::artifacts::objects::object_type::ObjectType;
use std::path::Path;

impl Repository {
    /// Write the tree `name` designates into `target`
    ///
    /// Commits and tags are peeled to their tree. `target` must be absent or
    /// an empty directory; HEAD and the index are left alone.
    pub fn checkout(&self, name: &str, target: &Path) -> anyhow::Result<()> {
        let tree_oid = self.find_required(name, ObjectType::Tree)?;

        prepare_target(target)?;
        let written = TreeWriter::new(self.database()).write_tree(&tree_oid, target)?;

        tracing::debug!(tree = %tree_oid, target = %target.display(), written, "checkout finished");
        Ok(())
    }
}
