use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use std::io::Write;

impl Repository {
    /// Print the object id `name` designates, peeled to `object_type` if given
    pub fn rev_parse(&self, name: &str, object_type: Option<ObjectType>) -> anyhow::Result<()> {
        let oid = self
            .find_object(name, object_type, true)?
            .ok_or_else(|| Error::NoSuchReference(name.to_string()))?;

        writeln!(self.writer(), "{oid}")?;
        Ok(())
    }
}
