use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// Difference between the HEAD tree and the index for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexChangeType {
    Added,
    Modified,
    Deleted,
}

/// Difference between the index and the working tree for one tracked path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChangeType {
    Modified,
    Deleted,
}

impl IndexChangeType {
    /// Column used by the short format
    pub fn short_code(&self) -> char {
        match self {
            IndexChangeType::Added => 'A',
            IndexChangeType::Modified => 'M',
            IndexChangeType::Deleted => 'D',
        }
    }

    fn label(&self) -> &'static str {
        match self {
            IndexChangeType::Added => "new file:   ",
            IndexChangeType::Modified => "modified:   ",
            IndexChangeType::Deleted => "deleted:    ",
        }
    }
}

impl WorkspaceChangeType {
    pub fn short_code(&self) -> char {
        match self {
            WorkspaceChangeType::Modified => 'M',
            WorkspaceChangeType::Deleted => 'D',
        }
    }

    fn label(&self) -> &'static str {
        match self {
            WorkspaceChangeType::Modified => "modified:   ",
            WorkspaceChangeType::Deleted => "deleted:    ",
        }
    }
}

/// A labelled change, rendered the way `git status` lists it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileChangeType {
    Index(IndexChangeType),
    Workspace(WorkspaceChangeType),
    Untracked,
}

impl std::fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let colored_str = match self {
            FileChangeType::Index(change) => change.label().green(),
            FileChangeType::Workspace(change) => change.label().red(),
            FileChangeType::Untracked => "".normal(),
        };
        write!(f, "{:>width$}{}", "", colored_str, width = LABEL_WIDTH)
    }
}
