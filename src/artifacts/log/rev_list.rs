use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

struct QueuedCommit {
    timestamp: i64,
    oid: ObjectId,
    commit: Commit,
}

impl PartialEq for QueuedCommit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedCommit {}

impl PartialOrd for QueuedCommit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedCommit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.oid.cmp(&other.oid))
    }
}

/// Commits reachable from a starting point, newest first
pub struct RevList<'r> {
    database: &'r Database,
    queue: BinaryHeap<QueuedCommit>,
    seen: HashSet<ObjectId>,
}

impl<'r> RevList<'r> {
    pub fn new(database: &'r Database, start: ObjectId) -> anyhow::Result<Self> {
        let mut rev_list = RevList {
            database,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
        };
        rev_list.enqueue(start)?;

        Ok(rev_list)
    }

    fn enqueue(&mut self, oid: ObjectId) -> anyhow::Result<()> {
        if !self.seen.insert(oid.clone()) {
            return Ok(());
        }

        let commit = self.database.load_commit(&oid)?;
        let timestamp = commit.timestamp().map(|t| t.timestamp()).unwrap_or_default();
        self.queue.push(QueuedCommit {
            timestamp,
            oid,
            commit,
        });

        Ok(())
    }
}

impl Iterator for RevList<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let QueuedCommit { oid, commit, .. } = self.queue.pop()?;

        for parent in commit.parents() {
            if let Err(err) = self.enqueue(parent.clone()) {
                return Some(Err(err));
            }
        }

        Some(Ok((oid, commit)))
    }
}
