//! Key-value list with message
//!
//! Payload encoding shared by commits and annotated tags:
//!
//! ```text
//! tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147
//! parent 206941306e8a8af65b66eaaaea388a7ae24d49a0
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL
//!  -----END PGP SIGNATURE-----
//!
//! free text message
//! ```
//!
//! Continuation lines start with a single space, which is stripped on decode.
//! Repeated keys accumulate their values in order.

use crate::errors::Error;
use std::io::Write;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    entries: Vec<(String, Vec<String>)>,
    message: String,
}

impl Kvlm {
    pub fn new(message: String) -> Self {
        Kvlm {
            entries: Vec::new(),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First value recorded under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Append a value, keeping the first-seen position of the key
    pub fn push(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    pub fn parse(raw: &[u8]) -> anyhow::Result<Self> {
        let raw = std::str::from_utf8(raw)
            .map_err(|_| Error::corrupt_object("kvlm", "payload is not UTF-8"))?;
        let bytes = raw.as_bytes();
        let mut kvlm = Kvlm::default();
        let mut pos = 0;

        loop {
            if pos == bytes.len() {
                // header only, no blank line and no message
                return Ok(kvlm);
            }

            let space = find_byte(bytes, pos, b' ');
            let newline = find_byte(bytes, pos, b'\n');

            // A newline before any space ends the header; it must be a blank line.
            let ends_header = match (space, newline) {
                (None, _) => true,
                (Some(s), Some(n)) => n < s,
                (Some(_), None) => false,
            };
            if ends_header {
                if newline != Some(pos) {
                    let reason = "header line without a value";
                    return Err(Error::corrupt_object("kvlm", reason).into());
                }
                kvlm.message = raw[pos + 1..].to_string();
                return Ok(kvlm);
            }

            let space = space.unwrap_or_default();
            let key = &raw[pos..space];

            // Extend the value over continuation lines.
            let mut end = space;
            loop {
                end = find_byte(bytes, end + 1, b'\n')
                    .ok_or_else(|| Error::corrupt_object("kvlm", "unterminated value"))?;
                if bytes.get(end + 1) != Some(&b' ') {
                    break;
                }
            }

            let value = raw[space + 1..end].replace("\n ", "\n");
            kvlm.push(key, value);
            pos = end + 1;
        }
    }

    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::new();

        for (key, values) in &self.entries {
            for value in values {
                writeln!(out, "{key} {}", value.replace('\n', "\n "))?;
            }
        }
        out.push(b'\n');
        out.extend_from_slice(self.message.as_bytes());

        Ok(out)
    }
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|offset| from + offset)
}
