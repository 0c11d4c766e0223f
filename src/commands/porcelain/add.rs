use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::Error;
use std::path::PathBuf;

impl Repository {
    /// Stage files, expanding directories to the files below them
    ///
    /// Every path is checked before anything is written; the index is
    /// rewritten once at the end.
    pub fn add(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut index = self.load_index()?;

        let names = paths
            .iter()
            .map(|path| self.workspace().expand(path))
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .flatten();

        for name in names {
            let blob = self.workspace().parse_blob(&name)?;
            let blob_id = self.database().store(&blob)?;
            let stat = self
                .workspace()
                .stat_file(&name)?
                .ok_or_else(|| Error::NotAFile(PathBuf::from(&name)))?;

            index.add(IndexEntry::new(name, blob_id, stat));
        }

        index.write_updates()
    }
}
