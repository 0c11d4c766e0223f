use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tag::Tag;
use crate::errors::Error;
use std::io::Write;

const TAGS_NAMESPACE: &str = "refs/tags";

impl Repository {
    /// Point `refs/tags/<name>` at `target`
    ///
    /// Annotated tags first store a tag object recording the target's real
    /// type, the tagger and `message`, and the reference points at that.
    pub fn create_tag(
        &self,
        name: &str,
        target: &str,
        annotated: bool,
        message: Option<&str>,
    ) -> anyhow::Result<ObjectId> {
        // tag names follow the same rules as branch names
        let name = BranchName::try_parse(name.to_string())?;
        let ref_name = format!("{TAGS_NAMESPACE}/{name}");
        if self.refs().exists(&ref_name) {
            return Err(Error::AlreadyExists(format!("tag '{name}'")).into());
        }

        let target_oid = self
            .find_object(target, None, true)?
            .ok_or_else(|| Error::NoSuchReference(target.to_string()))?;

        let tag_oid = if annotated {
            let target_type = self.database().object_type(&target_oid)?;
            let tagger = Author::load()?;
            let message = message.unwrap_or_default().to_string();
            let tag = Tag::new(target_oid, target_type, name.as_ref(), tagger, message);
            self.database().store(&tag)?
        } else {
            target_oid
        };

        self.refs().create(&format!("tags/{name}"), &tag_oid)?;
        Ok(tag_oid)
    }

    /// Print the name of every tag
    pub fn list_tags(&self) -> anyhow::Result<()> {
        let tags = self.refs().list()?.flatten("refs");

        for (name, _) in tags {
            if let Some(tag) = name.strip_prefix("refs/tags/") {
                writeln!(self.writer(), "{tag}")?;
            }
        }

        Ok(())
    }
}
