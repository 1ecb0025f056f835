/// Working-tree tallies derived from `git status --porcelain`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitStatusCounts {
    pub staged: u32,
    pub modified: u32,
    pub untracked: u32,
    pub deleted: u32,
    pub conflicts: u32,
}

impl GitStatusCounts {
    pub fn has_changes(&self) -> bool {
        self.staged > 0
            || self.modified > 0
            || self.untracked > 0
            || self.deleted > 0
            || self.conflicts > 0
    }
}

/// Commits relative to the configured upstream; zeros without one.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

impl AheadBehind {
    pub fn is_diverged(&self) -> bool {
        self.ahead > 0 || self.behind > 0
    }
}

/// `branch == None` means "no repository" (or git unavailable).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    pub branch: Option<String>,
    pub ahead_behind: AheadBehind,
    pub status: GitStatusCounts,
}

impl GitInfo {
    pub fn is_clean(&self) -> bool {
        !self.status.has_changes() && !self.ahead_behind.is_diverged()
    }
}
