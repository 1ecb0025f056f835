//! # Claude Usage Statusline
//!
//! A compact statusline for Claude Code sessions showing the model, git
//! state, context-window fill and the account's session/weekly usage quota.
//!
//! ## Overview
//!
//! Claude Code pipes a JSON session descriptor to the statusLine command on
//! stdin. This crate combines it with:
//! - Git branch, ahead/behind and working-tree counts (via the `git` CLI)
//! - Context-window utilization computed from the payload
//! - Session (5h) and weekly (7d) utilization from the Claude OAuth usage
//!   API, cached on disk for five minutes
//!
//! and prints one or two ANSI-colored lines.
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// On-disk TTL cache for the usage response
pub mod cache;

/// Command-line argument parsing and configuration
pub mod cli;

/// Context-window utilization
pub mod context;

/// OAuth token lookup (keychain, credentials file)
pub mod credentials;

/// Threshold coloring and segment formatting
pub mod display;

/// Timeout-bounded subprocess execution
pub mod exec;

/// Git repository inspection via the git CLI
pub mod git;

/// Self-install into the Claude config directory
pub mod install;

/// Data models for the session payload, git state and usage quota
pub mod models;

/// The render pipeline
pub mod statusline;

/// Online usage limits retrieved from the Claude OAuth API
pub mod usage_api;

/// Utility functions for paths, formatting, and time
pub mod utils;
