//! Git commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - Parent commit ID(s) (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! The payload is kept as a [`Kvlm`], so headers this crate does not know
//! about (`gpgsig`, `encoding`, ...) survive a read/write cycle.

use crate::areas::config;
use crate::artifacts::objects::kvlm::Kvlm;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use bytes::Bytes;
use std::io::BufRead;

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> timestamp timezone", the form stored in commits and tags
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Resolve the identity used for new commits and tags
    ///
    /// `GIT_AUTHOR_NAME` / `GIT_AUTHOR_EMAIL` (and optionally `GIT_AUTHOR_DATE`)
    /// win over `user.name` / `user.email` from the user-global git config.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = std::env::var("GIT_AUTHOR_NAME").ok();
        let env_email = std::env::var("GIT_AUTHOR_EMAIL").ok();

        let (name, email) = match (env_name, env_email) {
            (Some(name), Some(email)) => (name, email),
            (name, email) => {
                let global = config::global_identity();
                let name = name.or_else(|| global.as_ref().and_then(|(n, _)| n.clone()));
                let email = email.or_else(|| global.as_ref().and_then(|(_, e)| e.clone()));
                match (name, email) {
                    (Some(name), Some(email)) => (name, email),
                    _ => return Err(Error::MissingIdentity.into()),
                }
            }
        };

        let timestamp = std::env::var("GIT_AUTHOR_DATE")
            .ok()
            .and_then(|date_str| parse_git_date(&date_str));

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, email, ts)),
            None => Ok(Author::new(name, email)),
        }
    }

    /// "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| Error::corrupt_object("author", reason.to_string());

        // Split from the right: "name <email>" "timestamp" "timezone"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(invalid("expected 'name <email> timestamp timezone'").into());
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| invalid("invalid timestamp"))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| invalid("missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| invalid("missing '>'"))?;
        if email_end < email_start {
            return Err(invalid("mismatched '<' and '>'").into());
        }

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let offset = parse_offset(timezone).ok_or_else(|| invalid("invalid timezone"))?;
        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| invalid("timestamp out of range"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Parse a `GIT_AUTHOR_DATE` value
///
/// Accepts git's internal `<epoch> <tz>` form (optionally `@<epoch>`), RFC 2822
/// and `YYYY-MM-DD HH:MM:SS <tz>`.
pub fn parse_git_date(date: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    let date = date.trim();
    if let Some((epoch, timezone)) = date.split_once(' ') {
        let epoch = epoch.strip_prefix('@').unwrap_or(epoch);
        if let Ok(seconds) = epoch.parse::<i64>() {
            let offset = parse_offset(timezone)?;
            return chrono::DateTime::from_timestamp(seconds, 0)
                .map(|datetime| datetime.with_timezone(&offset));
        }
    }

    chrono::DateTime::parse_from_rfc2822(date)
        .or_else(|_| chrono::DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}

/// `+hhmm` / `-hhmm`
fn parse_offset(timezone: &str) -> Option<chrono::FixedOffset> {
    let epoch_in_zone = format!("1970-01-01 00:00:00 {timezone}");
    chrono::DateTime::parse_from_str(&epoch_in_zone, "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|datetime| *datetime.offset())
}

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    tree_oid: ObjectId,
    parents: Vec<ObjectId>,
    kvlm: Kvlm,
}

impl Commit {
    /// Create a new commit; the author doubles as committer
    ///
    /// A trailing newline is appended to the message when it lacks one, as
    /// git does.
    pub fn new(
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        author: Author,
        message: String,
    ) -> Self {
        let mut message = message;
        if !message.ends_with('\n') {
            message.push('\n');
        }

        let mut kvlm = Kvlm::new(message);
        kvlm.push("tree", tree_oid.to_string());
        for parent in &parents {
            kvlm.push("parent", parent.to_string());
        }
        kvlm.push("author", author.display());
        kvlm.push("committer", author.display());

        Commit {
            tree_oid,
            parents,
            kvlm,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> Option<Author> {
        self.kvlm.get("author").and_then(|a| Author::try_from(a).ok())
    }

    pub fn committer(&self) -> Option<Author> {
        self.kvlm.get("committer").and_then(|c| Author::try_from(c).ok())
    }

    pub fn message(&self) -> &str {
        self.kvlm.message()
    }

    /// First line of the message, for one-line summaries
    pub fn short_message(&self) -> &str {
        self.message().lines().next().unwrap_or("")
    }

    /// Committer time, falling back to author time; used to order history
    pub fn timestamp(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.committer()
            .or_else(|| self.author())
            .map(|a| a.timestamp())
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.kvlm.serialize()?))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let kvlm = Kvlm::parse(&content)?;

        let tree_oid = kvlm
            .get("tree")
            .ok_or_else(|| Error::corrupt_object("commit", "missing tree header"))?;
        let tree_oid = ObjectId::try_parse(tree_oid.to_string())?;
        let parents = kvlm
            .get_all("parent")
            .iter()
            .map(|parent| ObjectId::try_parse(parent.clone()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Commit {
            tree_oid,
            parents,
            kvlm,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.kvlm.serialize().unwrap_or_default()).into_owned()
    }
}
