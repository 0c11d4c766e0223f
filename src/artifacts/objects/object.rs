use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{BufRead, Write};

/// Encodes the object payload (everything after the `<type> <len>\0` header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decodes an object payload; the header has already been consumed
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// The exact byte sequence that gets hashed and stored
    fn to_bytes(&self) -> Result<Bytes> {
        let payload = self.serialize()?;

        let mut object_bytes = Vec::with_capacity(payload.len() + 32);
        write!(
            object_bytes,
            "{} {}\0",
            self.object_type().as_str(),
            payload.len()
        )?;
        object_bytes.extend_from_slice(&payload);

        Ok(Bytes::from(object_bytes))
    }

    fn object_id(&self) -> Result<ObjectId> {
        let content = self.to_bytes()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }
}

/// A payload that is hashed and stored byte for byte
///
/// Decoding and re-encoding can normalise a payload (tree modes such as
/// `100664` come back as `100644`), which would change its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    object_type: ObjectType,
    payload: Bytes,
}

impl RawObject {
    /// Keep `payload` as is once it decodes as `object_type`
    pub fn checked(object_type: ObjectType, payload: &[u8]) -> Result<Self> {
        ObjectBox::parse(object_type, payload)?;

        Ok(RawObject {
            object_type,
            payload: Bytes::copy_from_slice(payload),
        })
    }
}

impl Packable for RawObject {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.payload.clone())
    }
}

impl Object for RawObject {
    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Closed set of object kinds understood by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
    Tag(Box<Tag>),
}

impl ObjectBox {
    /// Decode a payload of the given kind
    pub fn parse(object_type: ObjectType, payload: &[u8]) -> Result<Self> {
        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(payload)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(payload)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(payload)?)),
            ObjectType::Tag => ObjectBox::Tag(Box::new(Tag::deserialize(payload)?)),
        })
    }

    pub fn into_blob(self) -> Option<Blob> {
        match self {
            ObjectBox::Blob(blob) => Some(*blob),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            ObjectBox::Tree(tree) => Some(*tree),
            _ => None,
        }
    }

    pub fn into_commit(self) -> Option<Commit> {
        match self {
            ObjectBox::Commit(commit) => Some(*commit),
            _ => None,
        }
    }
}

impl Packable for ObjectBox {
    fn serialize(&self) -> Result<Bytes> {
        match self {
            ObjectBox::Blob(blob) => blob.serialize(),
            ObjectBox::Tree(tree) => tree.serialize(),
            ObjectBox::Commit(commit) => commit.serialize(),
            ObjectBox::Tag(tag) => tag.serialize(),
        }
    }
}

impl Object for ObjectBox {
    fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
            ObjectBox::Tag(_) => ObjectType::Tag,
        }
    }

    fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
            ObjectBox::Tag(tag) => tag.display(),
        }
    }
}
