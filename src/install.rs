//! `install` subcommand: copy this binary into the Claude config directory
//! and point `settings.json`'s `statusLine` at it.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::format_cwd;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Installed,
    UpToDate,
    /// Replaced a differing file, which was first copied to `backup`.
    Replaced { backup: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOutcome {
    Updated,
    AlreadyConfigured,
}

/// Create `dir` if needed. Returns whether it had to be created.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(true)
}

/// Copy `source` to `dest`, keeping a timestamped backup of a differing
/// file already at `dest`. The installed copy is made executable.
pub fn copy_binary(source: &Path, dest: &Path) -> Result<CopyOutcome> {
    if !source.is_file() {
        bail!("Source file not found: {}", source.display());
    }

    let mut outcome = CopyOutcome::Installed;
    if dest.exists() {
        let src_bytes =
            fs::read(source).with_context(|| format!("Failed to read {}", source.display()))?;
        let dest_bytes =
            fs::read(dest).with_context(|| format!("Failed to read {}", dest.display()))?;
        if src_bytes == dest_bytes {
            return Ok(CopyOutcome::UpToDate);
        }
        let backup = PathBuf::from(format!(
            "{}.backup.{}",
            dest.display(),
            Utc::now().timestamp_millis()
        ));
        fs::copy(dest, &backup)
            .with_context(|| format!("Failed to back up {}", dest.display()))?;
        outcome = CopyOutcome::Replaced { backup };
    }

    fs::copy(source, dest).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), dest.display())
    })?;
    make_executable(dest)?;
    Ok(outcome)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// The stanza Claude Code runs for its status line.
pub fn status_line_stanza(command: &str) -> Value {
    json!({
        "type": "command",
        "command": command,
        "padding": 0,
    })
}

/// Merge our `statusLine` into the settings object, leaving other keys as
/// they were. An unreadable or non-object file is replaced by `{}` first.
pub fn update_settings(settings_path: &Path, command: &str) -> Result<SettingsOutcome> {
    let mut settings: Map<String, Value> = Map::new();
    if settings_path.exists() {
        let parsed = fs::read_to_string(settings_path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
        match parsed {
            Some(Value::Object(map)) => settings = map,
            _ => {
                tracing::warn!(
                    path = %settings_path.display(),
                    "settings file is not a JSON object"
                );
                report::warn(&format!("Warning: Could not parse existing {SETTINGS_FILE}"));
            }
        }
    }

    if let Some(existing) = settings.get("statusLine") {
        let same_type = existing.get("type").and_then(Value::as_str) == Some("command");
        let same_command = existing.get("command").and_then(Value::as_str) == Some(command);
        if same_type && same_command {
            return Ok(SettingsOutcome::AlreadyConfigured);
        }
    }

    settings.insert("statusLine".to_string(), status_line_stanza(command));
    let mut out = serde_json::to_string_pretty(&Value::Object(settings))?;
    out.push('\n');
    fs::write(settings_path, out)
        .with_context(|| format!("Failed to write {}", settings_path.display()))?;
    Ok(SettingsOutcome::Updated)
}

/// Full install of `source` into `claude_dir`.
pub fn run_install(claude_dir: &Path, source: &Path, home: Option<&str>) -> Result<()> {
    report::header();

    if ensure_dir(claude_dir)? {
        report::ok(&format!("Created {}", claude_dir.display()));
    }

    let file_name = source
        .file_name()
        .with_context(|| format!("Invalid source path: {}", source.display()))?;
    let dest = claude_dir.join(file_name);
    let name = file_name.to_string_lossy();

    match copy_binary(source, &dest)? {
        CopyOutcome::UpToDate => report::info(&format!("{name} is already up to date")),
        CopyOutcome::Replaced { backup } => {
            report::warn(&format!("Backed up existing file to {}", backup.display()));
            report::ok(&format!("Installed {name} to {}", claude_dir.display()));
        }
        CopyOutcome::Installed => {
            report::ok(&format!("Installed {name} to {}", claude_dir.display()))
        }
    }

    let command = format_cwd(&dest.to_string_lossy(), home);
    match update_settings(&claude_dir.join(SETTINGS_FILE), &command)? {
        SettingsOutcome::AlreadyConfigured => report::info("statusLine is already configured"),
        SettingsOutcome::Updated => {
            report::ok(&format!("Updated {SETTINGS_FILE} with statusLine config"))
        }
    }

    report::success();
    Ok(())
}

/// Installer console output (stdout, colored like the status line).
pub mod report {
    #[cfg(not(feature = "colors"))]
    use crate::display::color_shim::ColorizeShim as OwoColorize;
    #[cfg(feature = "colors")]
    use owo_colors::OwoColorize;

    pub fn info(msg: &str) {
        println!("{}", msg.cyan());
    }

    pub fn ok(msg: &str) {
        println!("{}", msg.green());
    }

    pub fn warn(msg: &str) {
        println!("{}", msg.yellow());
    }

    pub fn error(msg: &str) {
        println!("{}", msg.red());
    }

    pub fn header() {
        println!("{}", "Claude Usage Statusline Setup".cyan().bold());
        println!("{}", "-".repeat(30).cyan());
        println!();
    }

    pub fn success() {
        let rule = "=".repeat(50);
        println!();
        println!("{}", rule.cyan());
        println!("{}", "Claude Usage Statusline Setup Complete!".green().bold());
        println!("{}", rule.cyan());
        println!();
        info("Your statusline will show:");
        println!("  - Current model name");
        println!("  - Git branch with status (ahead/behind, staged, modified, untracked)");
        println!("  - Context window usage");
        println!("  - Session usage (5-hour limit)");
        println!("  - Weekly usage (7-day limit)");
        println!();
        info("Git indicators: ↑ahead ↓behind !conflicts +staged ~modified -deleted ?untracked ✓clean");
        println!();
        warn("Restart Claude Code to see the changes.");
        println!();
    }
}
