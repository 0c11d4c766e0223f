use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, RawObject};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Compute the id `path` would have as an object of `object_type`
    ///
    /// The content must decode as that type; it is hashed as read, never
    /// re-encoded. With `write` it is also stored.
    pub fn hash_object(
        &self,
        path: &Path,
        object_type: ObjectType,
        write: bool,
    ) -> anyhow::Result<()> {
        let data =
            std::fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
        let object = RawObject::checked(object_type, &data)?;

        let object_id = if write {
            self.database().store(&object)?
        } else {
            object.object_id()?
        };

        writeln!(self.writer(), "{object_id}")?;
        Ok(())
    }
}
