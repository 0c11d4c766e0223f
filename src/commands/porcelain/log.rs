use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print the history reachable from `start` (default HEAD), newest first
    pub fn log(&self, start: Option<&str>) -> anyhow::Result<()> {
        let start_oid = self.find_required(start.unwrap_or("HEAD"), ObjectType::Commit)?;

        let mut first = true;
        for item in RevList::new(self.database(), start_oid)? {
            let (oid, commit) = item?;
            if !first {
                writeln!(self.writer())?;
            }
            first = false;

            self.show_commit_medium(&oid, &commit)?;
        }

        Ok(())
    }

    fn show_commit_medium(&self, oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(self.writer(), "{}", format!("commit {oid}").yellow())?;
        if commit.parents().len() > 1 {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>();
            writeln!(self.writer(), "Merge: {}", parents.join(" "))?;
        }
        if let Some(author) = commit.author() {
            writeln!(self.writer(), "Author: {}", author.display_name())?;
            writeln!(self.writer(), "Date:   {}", author.readable_timestamp())?;
        }
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {message_line}")?;
        }

        Ok(())
    }
}
