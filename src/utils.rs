use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

/// Reset times are shown in this fixed zone (Asia/Taipei, UTC+8) regardless
/// of the host's locale.
pub const TIMEZONE_OFFSET_HOURS: i64 = 8;

/// Claude's configuration directory: the explicit override when given,
/// otherwise `~/.claude`.
pub fn claude_dir(override_dir: Option<&str>) -> PathBuf {
    if let Some(dir) = override_dir.map(str::trim).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".claude")
}

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf())
}

/// Read all of stdin. An interactive terminal is treated as "no input"
/// instead of blocking for a payload that will never arrive.
pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut buf = Vec::new();
    stdin.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Seconds since the epoch with millisecond precision.
pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Display form of a working directory: forward slashes, with the home
/// directory collapsed to `~`.
pub fn format_cwd(cwd: &str, home: Option<&str>) -> String {
    let cwd = cwd.replace('\\', "/");
    let Some(home) = home.map(|h| h.replace('\\', "/")).filter(|h| !h.is_empty()) else {
        return cwd;
    };
    let home = home.trim_end_matches('/');
    if home.is_empty() {
        return cwd;
    }

    if cwd == home {
        return "~".to_string();
    }
    match cwd.strip_prefix(home) {
        Some(rest) if rest.starts_with('/') => format!("~{rest}"),
        _ => cwd,
    }
}

/// Abbreviate a token count: `999`, `65k`, `1.5M`.
pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{}k", n / 1_000)
    } else {
        n.to_string()
    }
}

/// 12-hour clock with lowercase suffix; minutes only when non-zero.
pub fn format_hour(hour: u32, minute: u32) -> String {
    let (h, ampm) = match hour {
        0 => (12, "am"),
        1..=11 => (hour, "am"),
        12 => (12, "pm"),
        _ => (hour - 12, "pm"),
    };
    if minute > 0 {
        format!("{h}:{minute:02}{ampm}")
    } else {
        format!("{h}{ampm}")
    }
}

fn shift_to_display_zone(dt: DateTime<Utc>) -> NaiveDateTime {
    dt.naive_utc() + TimeDelta::hours(TIMEZONE_OFFSET_HOURS)
}

/// Time of day of a session reset, e.g. `2pm`; `N/A` when unknown.
pub fn format_reset_time(reset: Option<DateTime<Utc>>) -> String {
    match reset {
        Some(dt) => {
            let local = shift_to_display_zone(dt);
            format_hour(local.hour(), local.minute())
        }
        None => "N/A".to_string(),
    }
}

/// Date and time of a weekly reset, e.g. `Jan 24, 9am`; empty when unknown.
pub fn format_week_reset(reset: Option<DateTime<Utc>>) -> String {
    let Some(dt) = reset else {
        return String::new();
    };
    let local = shift_to_display_zone(dt);
    format!(
        "{} {}, {}",
        local.format("%b"),
        local.day(),
        format_hour(local.hour(), local.minute())
    )
}
