use crate::areas::repository::Repository;
use crate::errors::Error;
use std::io::Write;
use std::path::PathBuf;

impl Repository {
    /// Unstage files and, unless `cached`, delete them from the worktree
    pub fn rm(&self, paths: &[PathBuf], cached: bool) -> anyhow::Result<()> {
        let mut index = self.load_index()?;

        let names = paths
            .iter()
            .map(|path| self.workspace().relative_name(path))
            .collect::<anyhow::Result<Vec<_>>>()?;
        if let Some(unknown) = names.iter().find(|name| !index.is_tracked(name)) {
            return Err(Error::NotInIndex(unknown.clone()).into());
        }

        for name in names {
            index.remove(&name);
            if !cached {
                self.workspace().remove_file(&name)?;
            }
            writeln!(self.writer(), "rm '{name}'")?;
        }

        index.write_updates()
    }
}
