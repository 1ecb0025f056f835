use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn yellow(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn magenta(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn dimmed(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::models::{ContextUsage, GitInfo, UsageWindow};
use crate::utils::{format_reset_time, format_tokens, format_week_reset};

/// xterm-256 index used for the cwd line and the context "orange" band.
const ORANGE_256: u8 = 208;

pub const NO_TOKEN: &str = "No token";
pub const API_ERROR: &str = "API error";

static ANSI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));

/// Remove SGR escape sequences.
pub fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").into_owned()
}

#[cfg(feature = "colors")]
fn orange<T: Display>(text: T) -> String {
    text.color(owo_colors::XtermColors::from(ORANGE_256))
        .to_string()
}

#[cfg(not(feature = "colors"))]
fn orange<T: Display>(text: T) -> String {
    let _ = ORANGE_256;
    text.to_string()
}

/// Color band for session/week utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTier {
    Ok,
    Warning,
    Danger,
}

impl UsageTier {
    pub fn from_percent(pct: f64) -> Self {
        if pct >= 80.0 {
            UsageTier::Danger
        } else if pct >= 50.0 {
            UsageTier::Warning
        } else {
            UsageTier::Ok
        }
    }

    pub fn paint(self, text: &str) -> String {
        match self {
            UsageTier::Danger => text.red().to_string(),
            UsageTier::Warning => text.yellow().to_string(),
            UsageTier::Ok => text.green().to_string(),
        }
    }
}

/// Color band for context-window fill; one step finer than [`UsageTier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTier {
    Green,
    Yellow,
    Orange,
    Red,
}

impl ContextTier {
    pub fn from_percent(pct: f64) -> Self {
        if pct >= 80.0 {
            ContextTier::Red
        } else if pct >= 70.0 {
            ContextTier::Orange
        } else if pct >= 50.0 {
            ContextTier::Yellow
        } else {
            ContextTier::Green
        }
    }

    pub fn paint(self, text: &str) -> String {
        match self {
            ContextTier::Red => text.red().to_string(),
            ContextTier::Orange => orange(text),
            ContextTier::Yellow => text.yellow().to_string(),
            ContextTier::Green => text.green().to_string(),
        }
    }
}

fn whole_percent(pct: f64) -> String {
    format!("{}%", pct.round() as i64)
}

pub fn separator() -> String {
    format!(" {} ", "·".dimmed())
}

/// Join line-1 segments with the dim middle dot.
pub fn compose_line(segments: &[String]) -> String {
    segments.join(&separator())
}

/// Dim single-line message shown instead of the summary.
pub fn indicator_line(text: &str) -> String {
    text.dimmed().to_string()
}

pub fn model_segment(name: &str) -> String {
    name.magenta().bold().to_string()
}

/// Branch, divergence and working-tree glyphs; `None` outside a repository.
pub fn git_segment(info: &GitInfo) -> Option<String> {
    let branch = info.branch.as_deref()?;
    let mut parts = vec![branch.cyan().to_string()];

    let ab = info.ahead_behind;
    if ab.ahead > 0 {
        parts.push(format!("↑{}", ab.ahead).green().to_string());
    }
    if ab.behind > 0 {
        parts.push(format!("↓{}", ab.behind).yellow().to_string());
    }

    let st = info.status;
    if st.conflicts > 0 {
        parts.push(format!("!{}", st.conflicts).red().to_string());
    }
    if st.staged > 0 {
        parts.push(format!("+{}", st.staged).green().to_string());
    }
    if st.modified > 0 {
        parts.push(format!("~{}", st.modified).yellow().to_string());
    }
    if st.deleted > 0 {
        parts.push(format!("-{}", st.deleted).red().to_string());
    }
    if st.untracked > 0 {
        parts.push(format!("?{}", st.untracked).dimmed().to_string());
    }

    if info.is_clean() {
        parts.push("✓".green().to_string());
    }

    Some(parts.join(" "))
}

/// `Context P% (used/total)`
pub fn context_segment(ctx: &ContextUsage) -> String {
    let tier = ContextTier::from_percent(ctx.percentage);
    let detail = format!("({}/{})", format_tokens(ctx.used), format_tokens(ctx.total));
    format!(
        "Context {} {}",
        tier.paint(&whole_percent(ctx.percentage)),
        detail.dimmed()
    )
}

/// `Session P% @2pm`; the reset reads `N/A` when unknown.
pub fn session_segment(window: &UsageWindow) -> String {
    let pct = window.percent();
    let reset = format!("@{}", format_reset_time(window.resets_at));
    format!(
        "Session {} {}",
        UsageTier::from_percent(pct).paint(&whole_percent(pct)),
        reset.dimmed()
    )
}

/// `Week P% @Jan 24, 9am`; the reset suffix is dropped when unknown.
pub fn week_segment(window: &UsageWindow) -> String {
    let pct = window.percent();
    let painted = UsageTier::from_percent(pct).paint(&whole_percent(pct));
    let reset = format_week_reset(window.resets_at);
    if reset.is_empty() {
        format!("Week {painted}")
    } else {
        format!("Week {painted} {}", format!("@{reset}").dimmed())
    }
}

pub fn cwd_line(display_path: &str) -> String {
    orange(display_path)
}
