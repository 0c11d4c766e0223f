use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// List the entries of a tree-ish; `recursive` descends into subtrees
    pub fn ls_tree(&self, name: &str, recursive: bool) -> anyhow::Result<()> {
        let oid = self.find_required(name, ObjectType::Tree)?;
        self.print_tree(&oid, "", recursive)
    }

    fn print_tree(&self, oid: &ObjectId, prefix: &str, recursive: bool) -> anyhow::Result<()> {
        let tree = self.database().load_tree(oid)?;

        for entry in tree.entries() {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };

            if recursive && entry.is_tree() {
                self.print_tree(&entry.oid, &path, recursive)?;
            } else {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.mode,
                    entry.mode.object_kind(),
                    entry.oid,
                    path
                )?;
            }
        }

        Ok(())
    }
}
