//! Render pipeline: input → git → context → usage quota → formatted lines.
//!
//! External collaborators are trait objects so the whole pipeline can run
//! against fakes; [`StatusLine::from_env`] wires the real ones.

use std::path::Path;

use crate::cache::UsageCache;
use crate::context::calc_context_usage;
use crate::credentials::{TokenSource, config_dir_from_env, default_sources, resolve_token};
use crate::display::{
    API_ERROR, NO_TOKEN, compose_line, context_segment, cwd_line, git_segment, indicator_line,
    model_segment, session_segment, week_segment,
};
use crate::git::{GitCommand, GitRunner, read_git_info};
use crate::models::{SessionInput, UsageQuota};
use crate::usage_api::{HttpUsageFetcher, UsageFetcher};
use crate::utils::format_cwd;

/// Why no usage figures could be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageUnavailable {
    NoToken,
    ApiError,
}

impl UsageUnavailable {
    pub fn message(self) -> &'static str {
        match self {
            UsageUnavailable::NoToken => NO_TOKEN,
            UsageUnavailable::ApiError => API_ERROR,
        }
    }
}

pub struct StatusLine {
    pub git: Box<dyn GitRunner>,
    pub cache: UsageCache,
    pub token_sources: Vec<Box<dyn TokenSource>>,
    pub fetcher: Box<dyn UsageFetcher>,
    /// Collapsed to `~` in the cwd line.
    pub home_dir: Option<String>,
}

impl StatusLine {
    /// Production wiring: `git` on PATH, temp-dir cache, platform token
    /// sources under `config_dir`, HTTPS fetcher. The keychain entry follows
    /// `CLAUDE_CONFIG_DIR` only.
    pub fn from_env(config_dir: &Path) -> Self {
        let config_dir_env = config_dir_from_env();
        Self {
            git: Box::new(GitCommand::default()),
            cache: UsageCache::on_disk(),
            token_sources: default_sources(config_dir, config_dir_env.as_deref()),
            fetcher: Box::new(HttpUsageFetcher::default()),
            home_dir: crate::utils::home_dir().map(|h| h.to_string_lossy().into_owned()),
        }
    }

    /// Cached quota, or a fresh fetch that is then cached.
    pub fn usage_quota(&self) -> Result<UsageQuota, UsageUnavailable> {
        if let Some(cached) = self.cache.load() {
            return Ok(cached);
        }
        let token = resolve_token(&self.token_sources).ok_or(UsageUnavailable::NoToken)?;
        let quota = self
            .fetcher
            .fetch(&token)
            .ok_or(UsageUnavailable::ApiError)?;
        self.cache.save(&quota);
        Ok(quota)
    }

    /// Output lines for one invocation.
    ///
    /// Either the full summary (one line, plus the cwd line when a working
    /// directory is known) or a single dim indicator when usage data could
    /// not be obtained.
    pub fn render(&self, input: &SessionInput) -> Vec<String> {
        let cwd = input.working_dir();
        let git_info = read_git_info(self.git.as_ref(), cwd.map(Path::new));
        let ctx = calc_context_usage(input.context_window.as_ref());

        let quota = match self.usage_quota() {
            Ok(quota) => quota,
            Err(reason) => {
                tracing::debug!(?reason, "usage unavailable");
                return vec![indicator_line(reason.message())];
            }
        };

        let mut segments = Vec::new();
        if let Some(name) = input.model_name() {
            segments.push(model_segment(name));
        }
        if let Some(git) = git_segment(&git_info) {
            segments.push(git);
        }
        segments.push(context_segment(&ctx));
        segments.push(session_segment(&quota.session()));
        segments.push(week_segment(&quota.week()));

        let mut lines = vec![compose_line(&segments)];
        if let Some(cwd) = cwd {
            lines.push(cwd_line(&format_cwd(cwd, self.home_dir.as_deref())));
        }
        lines
    }
}
