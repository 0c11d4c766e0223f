//! Ignore rules
//!
//! Patterns come from two kinds of pools:
//! - absolute pools, read from `.git/info/exclude` and the user-global ignore
//!   file, matched against worktree-relative paths
//! - scoped pools, one per directory holding a staged `.gitignore`, matched
//!   against paths relative to that directory
//!
//! Within a pool the last matching pattern decides. Scoped pools are asked
//! innermost directory first; the absolute pools only when no scoped pool
//! has an opinion.

use crate::areas::config;
use crate::areas::index::Index;
use crate::areas::repository::Repository;
use derive_new::new;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeMap;
use std::path::Path;

const IGNORE_FILE_NAME: &str = ".gitignore";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pattern: Pattern,
    /// `false` for `!` patterns, which re-include a path
    exclude: bool,
    /// trailing `/`: only directories match
    dir_only: bool,
    /// the pattern contains a `/` and is matched against the whole relative path
    anchored: bool,
}

impl IgnoreRule {
    /// Parse one line of an ignore file; blanks and comments yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (exclude, line) = match line.strip_prefix('!') {
            Some(rest) => (false, rest),
            None => (true, line.strip_prefix('\\').unwrap_or(line)),
        };
        let (dir_only, line) = match line.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let anchored = line.contains('/');
        let line = line.trim_start_matches('/');
        if line.is_empty() {
            return None;
        }

        match Pattern::new(line) {
            Ok(pattern) => Some(IgnoreRule {
                pattern,
                exclude,
                dir_only,
                anchored,
            }),
            Err(err) => {
                tracing::debug!(pattern = line, "skipping invalid ignore pattern: {err}");
                None
            }
        }
    }

    /// Whether the rule applies to `path` or one of its parent directories
    fn matches(&self, path: &str) -> bool {
        let mut candidates: Vec<(&str, bool)> = path
            .match_indices('/')
            .map(|(pos, _)| (&path[..pos], true))
            .collect();
        candidates.push((path, false));

        candidates.into_iter().any(|(candidate, is_dir)| {
            if self.dir_only && !is_dir {
                return false;
            }
            if self.anchored {
                self.pattern.matches_with(candidate, MATCH_OPTIONS)
            } else {
                let base_name = candidate.rsplit('/').next().unwrap_or(candidate);
                self.pattern.matches_with(base_name, MATCH_OPTIONS)
            }
        })
    }
}

/// Patterns from a single source, evaluated last match wins
#[derive(Debug, Clone, Default, new)]
pub struct RulePool {
    rules: Vec<IgnoreRule>,
}

impl RulePool {
    pub fn parse(content: &str) -> Self {
        RulePool {
            rules: content.lines().filter_map(IgnoreRule::parse).collect(),
        }
    }

    /// `Some(true)` ignored, `Some(false)` explicitly kept, `None` no opinion
    pub fn check(&self, path: &str) -> Option<bool> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.exclude)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Default, new)]
pub struct IgnoreRules {
    absolute: Vec<RulePool>,
    /// directory (`""` for the root) -> patterns of its `.gitignore`
    scoped: BTreeMap<String, RulePool>,
}

impl IgnoreRules {
    /// Collect every pool that applies to the repository's worktree
    pub fn load(repository: &Repository, index: &Index) -> anyhow::Result<Self> {
        let mut absolute = Vec::new();

        let exclude_path = repository.git_path().join("info").join("exclude");
        let global_path = config::global_ignore_path();
        for path in std::iter::once(exclude_path).chain(global_path) {
            if let Some(pool) = read_pool(&path)? {
                absolute.push(pool);
            }
        }

        let mut scoped = BTreeMap::new();
        for entry in index.entries() {
            if entry.basename() != IGNORE_FILE_NAME {
                continue;
            }
            let blob = repository.database().load_blob(&entry.oid)?;
            let content = String::from_utf8_lossy(blob.content());
            tracing::trace!(file = %entry.name, "loaded staged ignore file");
            scoped.insert(entry.dirname().to_string(), RulePool::parse(&content));
        }

        Ok(IgnoreRules { absolute, scoped })
    }

    /// Whether an untracked worktree-relative `path` should be hidden
    pub fn is_ignored(&self, path: &str) -> bool {
        let mut dir = parent_dir(path);
        loop {
            if let Some(pool) = self.scoped.get(dir) {
                let relative = if dir.is_empty() {
                    path
                } else {
                    &path[dir.len() + 1..]
                };
                if let Some(ignored) = pool.check(relative) {
                    return ignored;
                }
            }
            if dir.is_empty() {
                break;
            }
            dir = parent_dir(dir);
        }

        self.absolute
            .iter()
            .find_map(|pool| pool.check(path))
            .unwrap_or(false)
    }
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|pos| &path[..pos]).unwrap_or("")
}

fn read_pool(path: &Path) -> anyhow::Result<Option<RulePool>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read(path)?;
    tracing::trace!(file = %path.display(), "loaded ignore file");
    Ok(Some(RulePool::parse(&String::from_utf8_lossy(&content))))
}
