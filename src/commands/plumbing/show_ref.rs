use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print every resolvable reference under `refs/` with its target
    pub fn show_ref(&self) -> anyhow::Result<()> {
        for (name, oid) in self.refs().list()?.flatten("refs") {
            writeln!(self.writer(), "{oid} {name}")?;
        }

        Ok(())
    }
}
