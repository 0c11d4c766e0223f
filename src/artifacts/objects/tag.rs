//! Annotated tag object
//!
//! ```text
//! object <target-sha>
//! type <target-type>
//! tag <name>
//! tagger <name> <email> <timestamp> <timezone>
//!
//! <message>
//! ```
//!
//! `object`, `type` and `tag` are required when decoding. `tagger` is
//! optional: tags from early git history carry none, so its absence is
//! accepted and [`Tag::tagger`] returns `None`. Tags created here always
//! record one.

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::kvlm::Kvlm;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use bytes::Bytes;
use std::io::BufRead;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    object: ObjectId,
    target_type: ObjectType,
    kvlm: Kvlm,
}

impl Tag {
    pub fn new(
        object: ObjectId,
        target_type: ObjectType,
        name: &str,
        tagger: Author,
        message: String,
    ) -> Self {
        let mut message = message;
        if !message.ends_with('\n') {
            message.push('\n');
        }

        let mut kvlm = Kvlm::new(message);
        kvlm.push("object", object.to_string());
        kvlm.push("type", target_type.to_string());
        kvlm.push("tag", name.to_string());
        kvlm.push("tagger", tagger.display());

        Tag {
            object,
            target_type,
            kvlm,
        }
    }

    /// The tagged object
    pub fn object(&self) -> &ObjectId {
        &self.object
    }

    pub fn target_type(&self) -> ObjectType {
        self.target_type
    }

    pub fn name(&self) -> &str {
        self.kvlm.get("tag").unwrap_or_default()
    }

    /// `None` when the header is absent or unparsable
    pub fn tagger(&self) -> Option<Author> {
        self.kvlm.get("tagger").and_then(|t| Author::try_from(t).ok())
    }

    pub fn message(&self) -> &str {
        self.kvlm.message()
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.kvlm.serialize()?))
    }
}

impl Unpackable for Tag {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        let kvlm = Kvlm::parse(&content)?;

        let missing = |key: &str| Error::corrupt_object("tag", format!("missing {key} header"));

        let object = kvlm.get("object").ok_or_else(|| missing("object"))?;
        let object = ObjectId::try_parse(object.to_string())?;
        let target_type = kvlm.get("type").ok_or_else(|| missing("type"))?;
        let target_type = ObjectType::try_from(target_type)?;
        kvlm.get("tag").ok_or_else(|| missing("tag"))?;

        Ok(Tag {
            object,
            target_type,
            kvlm,
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.kvlm.serialize().unwrap_or_default()).into_owned()
    }
}
