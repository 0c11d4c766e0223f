use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_type::ObjectType;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Create `branch_name` at `start` (default HEAD)
    pub fn branch(&self, branch_name: &str, start: Option<&str>) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let start_oid = self.find_required(start.unwrap_or("HEAD"), ObjectType::Commit)?;

        self.refs().create_branch(&branch_name, &start_oid)
    }

    /// List branches, marking the one HEAD points to
    pub fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().active_branch()?;

        for branch in self.refs().list_branches()? {
            if current.as_deref() == Some(branch.as_str()) {
                writeln!(self.writer(), "* {}", branch.green())?;
            } else {
                writeln!(self.writer(), "  {branch}")?;
            }
        }

        Ok(())
    }
}
