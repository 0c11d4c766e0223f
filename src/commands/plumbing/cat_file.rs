use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use std::io::Write;

impl Repository {
    /// Print the raw payload of `name`, peeled until it has `object_type`
    pub fn cat_file(&self, object_type: ObjectType, name: &str) -> anyhow::Result<()> {
        let oid = self.find_required(name, object_type)?;
        let payload = self.database().load(&oid)?.serialize()?;

        self.writer().write_all(&payload)?;
        Ok(())
    }

    /// Print `name` in human-readable form, whatever its type
    pub fn pretty_print(&self, name: &str) -> anyhow::Result<()> {
        let oid = self
            .find_object(name, None, true)?
            .ok_or_else(|| Error::NoSuchReference(name.to_string()))?;

        match self.database().load(&oid)? {
            ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
            ObjectBox::Tree(tree) if tree.is_empty() => {}
            ObjectBox::Tree(tree) => writeln!(self.writer(), "{}", tree.display())?,
            object => write!(self.writer(), "{}", object.display())?,
        }

        Ok(())
    }
}
