//! OAuth access token lookup.
//!
//! Sources are tried in order and the first non-empty token wins. Missing
//! credentials are an ordinary state (logged out), not an error.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::exec::run_with_timeout;

const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";
const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";
const KEYCHAIN_TIMEOUT: Duration = Duration::from_secs(5);
const CREDENTIALS_FILE: &str = ".credentials.json";

pub trait TokenSource {
    fn name(&self) -> &'static str;
    fn token(&self) -> Option<String>;
}

/// Pull `claudeAiOauth.accessToken` out of a credentials JSON document.
pub fn extract_access_token(raw: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;
    let token = json
        .get("claudeAiOauth")
        .and_then(|v| v.get("accessToken"))
        .and_then(|v| v.as_str())?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// `CLAUDE_CONFIG_DIR` from the environment, trimmed. Only the variable
/// selects a keychain entry; `--claude-config-dir` does not.
pub fn config_dir_from_env() -> Option<String> {
    std::env::var(CONFIG_DIR_ENV)
        .ok()
        .map(|dir| dir.trim().to_string())
        .filter(|dir| !dir.is_empty())
}

/// Keychain service name. A custom `CLAUDE_CONFIG_DIR` gets its own entry,
/// suffixed with the first 8 hex chars of the directory's SHA-256.
pub fn keychain_service_name(config_dir: Option<&str>) -> String {
    let mut service = KEYCHAIN_SERVICE.to_string();
    if let Some(dir) = config_dir.map(str::trim).filter(|d| !d.is_empty()) {
        let hash = Sha256::digest(dir.as_bytes());
        let suffix: String = format!("{hash:x}").chars().take(8).collect();
        service.push('-');
        service.push_str(&suffix);
    }
    service
}

/// macOS login keychain via `security find-generic-password`.
#[derive(Debug, Clone)]
pub struct KeychainSource {
    pub service: String,
    pub timeout: Duration,
}

impl KeychainSource {
    pub fn new(config_dir_env: Option<&str>) -> Self {
        Self {
            service: keychain_service_name(config_dir_env),
            timeout: KEYCHAIN_TIMEOUT,
        }
    }
}

impl TokenSource for KeychainSource {
    fn name(&self) -> &'static str {
        "keychain"
    }

    fn token(&self) -> Option<String> {
        let mut cmd = Command::new("security");
        cmd.args(["find-generic-password", "-s", &self.service, "-w"]);
        match run_with_timeout(&mut cmd, self.timeout) {
            Ok(out) => extract_access_token(&out),
            Err(err) => {
                tracing::debug!(service = %self.service, error = %err, "keychain lookup failed");
                None
            }
        }
    }
}

/// `<config dir>/.credentials.json`, used on Linux and Windows.
#[derive(Debug, Clone)]
pub struct CredentialsFileSource {
    pub path: PathBuf,
}

impl CredentialsFileSource {
    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(CREDENTIALS_FILE),
        }
    }
}

impl TokenSource for CredentialsFileSource {
    fn name(&self) -> &'static str {
        "credentials-file"
    }

    fn token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => extract_access_token(&raw),
            Err(err) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %err,
                    "credentials file unreadable"
                );
                None
            }
        }
    }
}

/// Platform default lookup order: keychain (macOS only), then the file.
pub fn default_sources(
    config_dir: &Path,
    config_dir_env: Option<&str>,
) -> Vec<Box<dyn TokenSource>> {
    let mut sources: Vec<Box<dyn TokenSource>> = Vec::new();
    if cfg!(target_os = "macos") {
        sources.push(Box::new(KeychainSource::new(config_dir_env)));
    }
    sources.push(Box::new(CredentialsFileSource::in_dir(config_dir)));
    sources
}

pub fn resolve_token(sources: &[Box<dyn TokenSource>]) -> Option<String> {
    sources.iter().find_map(|source| {
        let token = source.token();
        tracing::debug!(source = source.name(), found = token.is_some(), "token lookup");
        token
    })
}
