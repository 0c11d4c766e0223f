use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Create a repository at `path` and report where its metadata lives
    pub fn init(path: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        let repository = Repository::create(path, writer)?;

        writeln!(
            repository.writer(),
            "Initialized empty Git repository in {}/",
            repository.git_path().display()
        )?;

        Ok(repository)
    }
}
