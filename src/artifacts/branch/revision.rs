//! Name resolution
//!
//! Turns user-supplied names into object ids. Accepted forms:
//! - `HEAD` and its alias `@`
//! - full or abbreviated (at least 4 characters) hexadecimal object ids
//! - reference names, tried as `refs/<name>`, `refs/heads/<name>` and
//!   `refs/tags/<name>`, or given in full (`refs/heads/main`)

use crate::areas::refs::{HEAD_REF_NAME, is_safe_ref_path};
use crate::areas::repository::Repository;
use crate::artifacts::branch::REF_ALIASES;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;

/// Shortest abbreviated object id that is looked up in the database
pub const MIN_PREFIX_LENGTH: usize = 4;

impl Repository {
    /// Every object id `name` could designate, without duplicates
    pub fn resolve_name(&self, name: &str) -> anyhow::Result<Vec<ObjectId>> {
        let name = name.trim();
        let name = REF_ALIASES.get(name).copied().unwrap_or(name);
        if name.is_empty() {
            return Ok(Vec::new());
        }

        if name == HEAD_REF_NAME {
            return Ok(self.refs().read_head()?.into_iter().collect());
        }
        if !is_safe_ref_path(name) {
            return Err(Error::NoSuchReference(name.to_string()).into());
        }

        let mut candidates = Vec::new();

        if (MIN_PREFIX_LENGTH..=OBJECT_ID_LENGTH).contains(&name.len())
            && name.chars().all(|c| c.is_ascii_hexdigit())
        {
            candidates.extend(self.database().find_objects_by_prefix(name)?);
        }

        let mut ref_names = Vec::new();
        if name.starts_with("refs/") && self.refs().exists(name) {
            ref_names.push(name.to_string());
        }
        ref_names.extend(self.refs().find_candidates(name));
        for ref_name in ref_names {
            if let Some(oid) = self.refs().resolve(&ref_name)? {
                candidates.push(oid);
            }
        }

        let mut unique = Vec::with_capacity(candidates.len());
        for oid in candidates {
            if !unique.contains(&oid) {
                unique.push(oid);
            }
        }

        Ok(unique)
    }

    /// Resolve `name` to exactly one object, optionally of a given type
    ///
    /// When the object is not of the `expected` type, annotated tags are
    /// followed to their target and commits to their tree (only when a tree
    /// is expected). With `follow` unset, the first mismatch yields `None`.
    pub fn find_object(
        &self,
        name: &str,
        expected: Option<ObjectType>,
        follow: bool,
    ) -> anyhow::Result<Option<ObjectId>> {
        let mut candidates = self.resolve_name(name)?;

        let mut oid = match candidates.len() {
            0 => return Err(Error::NoSuchReference(name.to_string()).into()),
            1 => candidates.remove(0),
            _ => {
                return Err(Error::AmbiguousReference {
                    name: name.to_string(),
                    candidates: candidates.iter().map(ObjectId::to_string).collect(),
                }
                .into());
            }
        };

        let Some(expected) = expected else {
            return Ok(Some(oid));
        };

        loop {
            let object = self.database().load(&oid)?;
            let actual = object.object_type();
            if actual == expected {
                return Ok(Some(oid));
            }
            if !follow {
                return Ok(None);
            }

            oid = match object {
                ObjectBox::Tag(tag) => tag.object().clone(),
                ObjectBox::Commit(commit) if expected == ObjectType::Tree => {
                    commit.tree_oid().clone()
                }
                _ => {
                    return Err(Error::WrongObjectType {
                        oid: oid.to_string(),
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    }
                    .into());
                }
            };
            tracing::trace!(%oid, "following link while resolving {name}");
        }
    }

    /// Like [`Repository::find_object`] with `follow`, failing instead of returning `None`
    pub fn find_required(&self, name: &str, expected: ObjectType) -> anyhow::Result<ObjectId> {
        self.find_object(name, Some(expected), true)?
            .ok_or_else(|| Error::NoSuchReference(name.to_string()).into())
    }
}
