//! # Git Module
//!
//! Derives branch, ahead/behind and working-tree counts by shelling out to
//! `git`. Each query is its own short-lived subprocess with a fixed timeout;
//! any failure reads as "no data" so the statusline always renders.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::exec::run_with_timeout;
use crate::models::git::{AheadBehind, GitInfo, GitStatusCounts};

/// Per-query deadline for git subprocesses.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a git query in a directory. `None` means no usable output.
pub trait GitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Option<String>;
}

/// The real `git` executable.
#[derive(Debug, Clone)]
pub struct GitCommand {
    pub timeout: Duration,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            timeout: GIT_TIMEOUT,
        }
    }
}

impl GitRunner for GitCommand {
    fn run(&self, args: &[&str], cwd: &Path) -> Option<String> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(cwd);
        match run_with_timeout(&mut cmd, self.timeout) {
            Ok(out) => Some(out),
            Err(err) => {
                tracing::debug!(?args, cwd = %cwd.display(), error = %err, "git query failed");
                None
            }
        }
    }
}

/// Trimmed output, with empty output treated the same as a failed query.
fn query(runner: &dyn GitRunner, args: &[&str], cwd: &Path) -> Option<String> {
    runner
        .run(args, cwd)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn read_branch(runner: &dyn GitRunner, cwd: &Path) -> Option<String> {
    query(runner, &["rev-parse", "--abbrev-ref", "HEAD"], cwd)
}

pub fn read_ahead_behind(runner: &dyn GitRunner, cwd: &Path) -> AheadBehind {
    let Some(upstream) = query(runner, &["rev-parse", "--abbrev-ref", "@{upstream}"], cwd) else {
        return AheadBehind::default();
    };
    let range = format!("HEAD...{upstream}");
    query(runner, &["rev-list", "--left-right", "--count", &range], cwd)
        .and_then(|out| parse_left_right_count(&out))
        .unwrap_or_default()
}

/// Parse `rev-list --left-right --count` output: `"<ahead>\t<behind>"`.
pub fn parse_left_right_count(out: &str) -> Option<AheadBehind> {
    let parts: Vec<&str> = out.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }
    Some(AheadBehind {
        ahead: parts[0].parse().unwrap_or(0),
        behind: parts[1].parse().unwrap_or(0),
    })
}

pub fn read_status(runner: &dyn GitRunner, cwd: &Path) -> GitStatusCounts {
    runner
        .run(&["status", "--porcelain"], cwd)
        .map(|out| parse_porcelain_status(&out))
        .unwrap_or_default()
}

/// Tally `git status --porcelain` lines.
///
/// The first two characters of each line are the index and worktree states.
/// Conflicts are exclusive of the staged/index-deleted check; the worktree
/// and untracked checks apply to every line independently.
pub fn parse_porcelain_status(out: &str) -> GitStatusCounts {
    let mut counts = GitStatusCounts::default();

    for line in out.lines() {
        let mut chars = line.chars();
        let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
            continue;
        };

        if index == 'U' || worktree == 'U' {
            counts.conflicts += 1;
        } else if matches!(index, 'A' | 'M' | 'R' | 'C') {
            counts.staged += 1;
        } else if index == 'D' {
            counts.deleted += 1;
        }

        if worktree == 'M' {
            counts.modified += 1;
        } else if worktree == 'D' && index != 'D' {
            counts.deleted += 1;
        }

        if index == '?' && worktree == '?' {
            counts.untracked += 1;
        }
    }

    counts
}

/// Collect everything the statusline shows about the repository at `cwd`.
///
/// Without a working directory, or outside a repository, this is
/// `GitInfo::default()` and no further queries are made.
pub fn read_git_info(runner: &dyn GitRunner, cwd: Option<&Path>) -> GitInfo {
    let Some(cwd) = cwd else {
        return GitInfo::default();
    };
    let Some(branch) = read_branch(runner, cwd) else {
        return GitInfo::default();
    };

    GitInfo {
        branch: Some(branch),
        ahead_behind: read_ahead_behind(runner, cwd),
        status: read_status(runner, cwd),
    }
}
