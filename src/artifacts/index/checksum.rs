use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::Error;
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that hashes everything passing through it, for the index trailer
#[derive(Debug)]
pub struct Checksum<W: Write> {
    writer: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub(crate) fn new(writer: W) -> Self {
        Checksum {
            writer,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the digest of everything written so far and hand back the writer
    pub(crate) fn write_checksum(mut self) -> anyhow::Result<W> {
        let checksum = self.digest.finalize();
        self.writer.write_all(checksum.as_slice())?;

        Ok(self.writer)
    }
}

/// Check the trailing SHA-1 of a complete index file
pub(crate) fn verify(data: &[u8]) -> anyhow::Result<()> {
    if data.len() < CHECKSUM_SIZE {
        return Err(Error::CorruptIndex("truncated checksum".to_string()).into());
    }
    let (content, expected) = data.split_at(data.len() - CHECKSUM_SIZE);

    let actual = Sha1::digest(content);
    if actual.as_slice() != expected {
        return Err(Error::CorruptIndex("checksum does not match content".to_string()).into());
    }

    Ok(())
}
