use claude_usage_statusline::install::{
    CopyOutcome, SettingsOutcome, copy_binary, run_install, update_settings,
};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_copy_new_then_up_to_date() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("statusline");
    let dest = tmp.path().join("installed");
    fs::write(&src, b"binary-v1").unwrap();

    assert_eq!(copy_binary(&src, &dest).unwrap(), CopyOutcome::Installed);
    assert_eq!(fs::read(&dest).unwrap(), b"binary-v1");
    assert_eq!(copy_binary(&src, &dest).unwrap(), CopyOutcome::UpToDate);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn test_copy_backs_up_differing_file() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("statusline");
    let dest = tmp.path().join("installed");
    fs::write(&src, b"binary-v2").unwrap();
    fs::write(&dest, b"hand-edited").unwrap();

    let outcome = copy_binary(&src, &dest).unwrap();
    let CopyOutcome::Replaced { backup } = &outcome else {
        panic!("expected a backup, got {outcome:?}");
    };
    assert!(
        backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("installed.backup.")
    );
    assert_eq!(fs::read(backup).unwrap(), b"hand-edited");
    assert_eq!(fs::read(&dest).unwrap(), b"binary-v2");
}

#[test]
fn test_settings_merge_keeps_other_keys_in_order() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    fs::write(
        &settings,
        r#"{"model":"opus","permissions":{"allow":["Bash(ls)"]},"statusLine":{"type":"command","command":"old"}}"#,
    )
    .unwrap();

    assert_eq!(
        update_settings(&settings, "~/.claude/claude_usage_statusline").unwrap(),
        SettingsOutcome::Updated
    );
    let json = read_json(&settings);
    assert_eq!(json["model"], "opus");
    assert_eq!(json["permissions"]["allow"][0], "Bash(ls)");
    assert_eq!(json["statusLine"]["type"], "command");
    assert_eq!(json["statusLine"]["command"], "~/.claude/claude_usage_statusline");
    assert_eq!(json["statusLine"]["padding"], 0);
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["model", "permissions", "statusLine"]);
    assert!(fs::read_to_string(&settings).unwrap().ends_with("}\n"));
}

#[test]
fn test_settings_already_configured_skips_write() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    let original = r#"{"statusLine":{"type":"command","command":"~/.claude/sl","padding":2}}"#;
    fs::write(&settings, original).unwrap();

    assert_eq!(
        update_settings(&settings, "~/.claude/sl").unwrap(),
        SettingsOutcome::AlreadyConfigured
    );
    assert_eq!(fs::read_to_string(&settings).unwrap(), original);
}

#[test]
fn test_settings_missing_or_corrupt_file() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("settings.json");
    assert_eq!(
        update_settings(&settings, "cmd").unwrap(),
        SettingsOutcome::Updated
    );
    assert_eq!(read_json(&settings)["statusLine"]["command"], "cmd");

    fs::write(&settings, "{ trailing,").unwrap();
    assert_eq!(
        update_settings(&settings, "cmd").unwrap(),
        SettingsOutcome::Updated
    );
    let json = read_json(&settings);
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[test]
fn test_run_install_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let home = tmp.path().join("home");
    let claude_dir = home.join(".claude");
    let src = tmp.path().join("claude_usage_statusline");
    fs::write(&src, b"binary").unwrap();

    let home_str = home.to_string_lossy().into_owned();
    run_install(&claude_dir, &src, Some(&home_str)).unwrap();

    assert_eq!(fs::read(claude_dir.join("claude_usage_statusline")).unwrap(), b"binary");
    let json = read_json(&claude_dir.join("settings.json"));
    assert_eq!(
        json["statusLine"]["command"],
        "~/.claude/claude_usage_statusline"
    );

    // Re-running is idempotent.
    run_install(&claude_dir, &src, Some(&home_str)).unwrap();
    let entries = fs::read_dir(&claude_dir).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn test_run_install_missing_source_fails() {
    let tmp = TempDir::new().unwrap();
    let err = run_install(&tmp.path().join(".claude"), &tmp.path().join("missing"), None)
        .unwrap_err();
    assert!(err.to_string().contains("Source file not found"));
}
