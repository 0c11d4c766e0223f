use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Error;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Loose object store under `.git/objects`
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

// TODO: implement packfiles for better performance and storage efficiency
impl Database {
    pub fn new(path: PathBuf) -> Self {
        Database {
            path: path.into_boxed_path(),
        }
    }

    /// Write `object` unless it is already stored and return its id
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        // objects are write-once: an existing file already holds these bytes
        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(&object_path, object.to_bytes()?)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    /// Read, inflate and decode the object named by `object_id`
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, payload) = self.read_raw(object_id)?;

        ObjectBox::parse(object_type, &payload)
            .with_context(|| format!("Unable to decode {object_type} {object_id}"))
    }

    /// Type recorded in the object header, without decoding the payload
    pub fn object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        Ok(self.read_raw(object_id)?.0)
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let object = self.load(object_id)?;
        let actual = object.object_type();
        object
            .into_blob()
            .ok_or_else(|| wrong_type(object_id, ObjectType::Blob, actual))
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let object = self.load(object_id)?;
        let actual = object.object_type();
        object
            .into_tree()
            .ok_or_else(|| wrong_type(object_id, ObjectType::Tree, actual))
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let object = self.load(object_id)?;
        let actual = object.object_type();
        object
            .into_commit()
            .ok_or_else(|| wrong_type(object_id, ObjectType::Commit, actual))
    }

    /// Split an object file into its header type and its validated payload
    fn read_raw(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.is_file() {
            return Err(Error::ObjectNotFound(object_id.to_string()).into());
        }

        let content = self.read_object(&object_path)?;
        let corrupt = |reason: &str| Error::corrupt_object(object_id, reason.to_string());

        let space = content
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| corrupt("missing space in header"))?;
        let nul = content[space..]
            .iter()
            .position(|&b| b == 0)
            .map(|offset| space + offset)
            .ok_or_else(|| corrupt("missing NUL in header"))?;

        let type_name =
            std::str::from_utf8(&content[..space]).map_err(|_| corrupt("non-ASCII type"))?;
        let object_type = ObjectType::try_from(type_name)?;

        let declared = std::str::from_utf8(&content[space + 1..nul])
            .ok()
            .and_then(|len| len.parse::<usize>().ok())
            .ok_or_else(|| corrupt("invalid length in header"))?;
        let payload = content.slice(nul + 1..);
        if payload.len() != declared {
            return Err(corrupt(&format!(
                "declared length {declared} but payload has {} bytes",
                payload.len()
            ))
            .into());
        }

        Ok((object_type, payload))
    }

    fn read_object(&self, object_path: &Path) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with the given hex prefix
    ///
    /// Only the `objects/<prefix[..2]>/` directory is scanned, so the prefix
    /// must hold at least two characters; shorter prefixes match nothing.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path)? {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix) {
                // temp files and strays are not valid ids and get skipped
                if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    matches.push(oid);
                }
            }
        }
        matches.sort();

        Ok(matches)
    }
}

fn wrong_type(object_id: &ObjectId, expected: ObjectType, actual: ObjectType) -> anyhow::Error {
    Error::WrongObjectType {
        oid: object_id.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
    .into()
}
