use crate::areas::repository::Repository;
use crate::artifacts::status::file_change::FileChangeType;
use crate::artifacts::status::status_info::{HeadState, Status, StatusInfo};
use std::collections::BTreeSet;
use std::io::Write;

impl Repository {
    /// Report staged, unstaged and untracked changes
    ///
    /// `porcelain` selects the stable two-column format (`XY path`).
    pub fn status(&self, porcelain: bool) -> anyhow::Result<()> {
        let info = Status::new(self).initialize()?;

        if porcelain {
            self.print_porcelain_status(&info)
        } else {
            self.print_long_status(&info)
        }
    }

    fn print_porcelain_status(&self, info: &StatusInfo) -> anyhow::Result<()> {
        let changed = info
            .staged
            .keys()
            .chain(info.unstaged.keys())
            .collect::<BTreeSet<_>>();

        for path in changed {
            let index_code = info.staged.get(path).map_or(' ', |change| change.short_code());
            let workspace_code = info
                .unstaged
                .get(path)
                .map_or(' ', |change| change.short_code());
            writeln!(self.writer(), "{index_code}{workspace_code} {path}")?;
        }

        for path in &info.untracked {
            writeln!(self.writer(), "?? {path}")?;
        }

        Ok(())
    }

    fn print_long_status(&self, info: &StatusInfo) -> anyhow::Result<()> {
        match &info.head {
            HeadState::Branch(branch) => writeln!(self.writer(), "On branch {branch}")?,
            HeadState::Detached(Some(oid)) => {
                writeln!(self.writer(), "HEAD detached at {}", oid.to_short_oid())?
            }
            HeadState::Detached(None) => writeln!(self.writer(), "HEAD detached")?,
        }

        if info.is_clean() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
            return Ok(());
        }

        if !info.staged.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            for (path, change) in &info.staged {
                writeln!(self.writer(), "{}{path}", FileChangeType::Index(*change))?;
            }
        }

        if !info.unstaged.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            for (path, change) in &info.unstaged {
                writeln!(self.writer(), "{}{path}", FileChangeType::Workspace(*change))?;
            }
        }

        if !info.untracked.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for path in &info.untracked {
                writeln!(self.writer(), "{}{path}", FileChangeType::Untracked)?;
            }
        }

        Ok(())
    }
}
